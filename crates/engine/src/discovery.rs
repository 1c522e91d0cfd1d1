//! oEmbed endpoint discovery from `<link type="...+oembed">` tags.

use std::{collections::HashMap, fmt, sync::Arc};

use once_cell::sync::Lazy;
use oembed_api::{FetchOptions, HttpFetcher};
use oembed_types::{OEmbedError, ResponseFormat};
use regex::Regex;
use tracing::{debug, info};

use crate::config::TieBreak;

/// Matches a discovery `<link>` tag; group 1 is the media type.
static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let media_types = [ResponseFormat::Json, ResponseFormat::Xml]
        .iter()
        .map(|format| regex::escape(format.media_type()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r#"(?i)<link[^>]*type=[^"]*"({media_types})\+oembed"[^>]*>"#))
        .expect("link pattern should compile")
});

static HREF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href=[^"]*"([^"]+)""#).expect("href pattern should compile"));

/// A discovery link found in a page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub format: ResponseFormat,
    pub href: Option<String>,
}

/// Scan `html` for oEmbed discovery links.
pub fn scan_links(html: &str) -> Vec<DiscoveredLink> {
    LINK_PATTERN
        .captures_iter(html)
        .filter_map(|captures| {
            let tag = captures.get(0)?.as_str();
            let format = ResponseFormat::from_media_type(captures.get(1)?.as_str())?;
            let href = HREF_PATTERN
                .captures(tag)
                .and_then(|href| href.get(1))
                .map(|href| decode_entities(href.as_str()));
            Some(DiscoveredLink { format, href })
        })
        .collect()
}

/// Pick the endpoint among `links`: the first link in `preferred` format wins,
/// otherwise the first or last link depending on `tie_break`.
///
/// # Errors
/// [`OEmbedError::Discovery`] when `links` is empty or the chosen link has no `href`.
pub fn select_endpoint(
    page_url: &str,
    links: &[DiscoveredLink],
    preferred: ResponseFormat,
    tie_break: TieBreak,
) -> Result<String, OEmbedError> {
    let discovery_error = |reason: &str| OEmbedError::Discovery {
        url: page_url.to_string(),
        reason: reason.to_string(),
    };

    let chosen = links.iter().find(|link| link.format == preferred).or(match tie_break {
        TieBreak::First => links.first(),
        TieBreak::Last => links.last(),
    });
    let Some(link) = chosen else {
        return Err(discovery_error("no valid oEmbed links found on page"));
    };

    link.href
        .clone()
        .ok_or_else(|| discovery_error("no \"href\" attribute was found in the <link> tag"))
}

fn decode_entities(href: &str) -> String {
    href.replace("&amp;", "&").replace("&#38;", "&")
}

/// Fetches resource pages and extracts their advertised oEmbed endpoint.
///
/// Successful discoveries are cached per page URL for the lifetime of the
/// discoverer; failures are not cached.
pub struct Discoverer {
    fetcher: Arc<dyn HttpFetcher>,
    options: FetchOptions,
    preferred_format: ResponseFormat,
    tie_break: TieBreak,
    cache: HashMap<String, String>,
}

impl fmt::Debug for Discoverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discoverer")
            .field("options", &self.options)
            .field("preferred_format", &self.preferred_format)
            .field("tie_break", &self.tie_break)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl Discoverer {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, options: FetchOptions) -> Self {
        Self {
            fetcher,
            options,
            preferred_format: ResponseFormat::default(),
            tie_break: TieBreak::default(),
            cache: HashMap::new(),
        }
    }

    pub fn with_preferred_format(mut self, format: ResponseFormat) -> Self {
        self.preferred_format = format;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn preferred_format(&self) -> ResponseFormat {
        self.preferred_format
    }

    /// Fetch `url` and return the oEmbed endpoint its markup advertises.
    ///
    /// # Errors
    /// - [`OEmbedError::Transport`] / [`OEmbedError::HttpStatus`] when the page cannot be fetched
    /// - [`OEmbedError::Discovery`] when the page has no usable discovery link
    pub fn discover_endpoint(&mut self, url: &str) -> Result<String, OEmbedError> {
        if let Some(endpoint) = self.cache.get(url) {
            debug!(%url, %endpoint, "discovery cache hit");
            return Ok(endpoint.clone());
        }
        debug!(%url, "discovery cache miss");

        let endpoint = self.fetch_endpoint(url)?;
        info!(%url, %endpoint, "discovered oEmbed endpoint");
        self.cache.insert(url.to_string(), endpoint.clone());
        Ok(endpoint)
    }

    pub fn cached_endpoint(&self, url: &str) -> Option<&str> {
        self.cache.get(url).map(String::as_str)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn fetch_endpoint(&self, url: &str) -> Result<String, OEmbedError> {
        let response = self.fetcher.get(url, &self.options)?;
        if response.status != 200 {
            return Err(OEmbedError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        let links = scan_links(&response.body);
        debug!(%url, links = links.len(), "scanned page for discovery links");
        select_endpoint(url, &links, self.preferred_format, self.tie_break)
    }
}

#[cfg(test)]
mod tests {
    use oembed_api::StaticFetcher;

    use super::*;

    const PAGE: &str = "http://blog.example/post/1";

    fn discoverer(body: &str) -> (Arc<StaticFetcher>, Discoverer) {
        let fetcher = Arc::new(StaticFetcher::new().with_body(PAGE, 200, body));
        let discoverer = Discoverer::new(fetcher.clone(), FetchOptions::default());
        (fetcher, discoverer)
    }

    #[test]
    fn extracts_json_link() {
        let html = r#"<html><head><link rel="alternate" type="application/json+oembed" href="http://x/oembed?url=a&amp;format=json"></head></html>"#;
        let (_, mut discoverer) = discoverer(html);
        assert_eq!(
            discoverer.discover_endpoint(PAGE).unwrap(),
            "http://x/oembed?url=a&format=json"
        );
    }

    #[test]
    fn href_before_type_is_found() {
        let html = r#"<LINK href="http://x/oembed.xml" TYPE="text/xml+oembed" />"#;
        let links = scan_links(html);
        assert_eq!(
            links,
            vec![DiscoveredLink {
                format: ResponseFormat::Xml,
                href: Some("http://x/oembed.xml".to_string()),
            }]
        );
    }

    #[test]
    fn page_without_links_is_a_discovery_error() {
        let (_, mut discoverer) = discoverer("<html><head><title>plain</title></head></html>");
        let error = discoverer.discover_endpoint(PAGE).unwrap_err();
        assert!(matches!(error, OEmbedError::Discovery { .. }), "got {error:?}");
        assert!(discoverer.cached_endpoint(PAGE).is_none());
    }

    #[test]
    fn link_without_href_is_a_discovery_error() {
        let (_, mut discoverer) = discoverer(r#"<link rel="alternate" type="application/json+oembed">"#);
        let error = discoverer.discover_endpoint(PAGE).unwrap_err();
        assert!(error.to_string().contains("href"), "got {error}");
    }

    #[test]
    fn preferred_format_wins_over_order() {
        let html = r#"
            <link type="text/xml+oembed" href="http://x/1.xml">
            <link type="application/json+oembed" href="http://x/2.json">
            <link type="text/xml+oembed" href="http://x/3.xml">
        "#;
        let links = scan_links(html);
        assert_eq!(
            select_endpoint(PAGE, &links, ResponseFormat::Json, TieBreak::Last).unwrap(),
            "http://x/2.json"
        );
        assert_eq!(
            select_endpoint(PAGE, &links, ResponseFormat::Xml, TieBreak::Last).unwrap(),
            "http://x/1.xml"
        );
    }

    #[test]
    fn tie_break_applies_without_preferred_match() {
        let html = r#"
            <link type="text/xml+oembed" href="http://x/a.xml">
            <link type="text/xml+oembed" href="http://x/b.xml">
        "#;
        let links = scan_links(html);
        assert_eq!(
            select_endpoint(PAGE, &links, ResponseFormat::Json, TieBreak::Last).unwrap(),
            "http://x/b.xml"
        );
        assert_eq!(
            select_endpoint(PAGE, &links, ResponseFormat::Json, TieBreak::First).unwrap(),
            "http://x/a.xml"
        );
    }

    #[test]
    fn cached_endpoint_is_not_refetched() {
        let (fetcher, mut discoverer) = discoverer(r#"<link type="application/json+oembed" href="http://x/oembed">"#);
        assert_eq!(discoverer.discover_endpoint(PAGE).unwrap(), "http://x/oembed");
        assert_eq!(discoverer.discover_endpoint(PAGE).unwrap(), "http://x/oembed");
        assert_eq!(fetcher.request_count(), 1);

        discoverer.clear_cache();
        discoverer.discover_endpoint(PAGE).unwrap();
        assert_eq!(fetcher.request_count(), 2);
    }

    #[test]
    fn fetch_failures_propagate_unchanged() {
        let fetcher = Arc::new(StaticFetcher::new().with_transport_failure(PAGE, "connection reset"));
        let mut discoverer = Discoverer::new(fetcher, FetchOptions::default());
        assert!(matches!(
            discoverer.discover_endpoint(PAGE),
            Err(OEmbedError::Transport { .. })
        ));
        assert!(matches!(
            discoverer.discover_endpoint("http://unknown.example/"),
            Err(OEmbedError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn non_200_success_status_is_rejected() {
        let fetcher = Arc::new(StaticFetcher::new().with_body(PAGE, 203, r#"<link type="application/json+oembed" href="http://x/">"#));
        let mut discoverer = Discoverer::new(fetcher, FetchOptions::default());
        assert!(matches!(
            discoverer.discover_endpoint(PAGE),
            Err(OEmbedError::HttpStatus { status: 203, .. })
        ));
    }
}
