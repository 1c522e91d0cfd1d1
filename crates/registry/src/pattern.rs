//! Glob-style provider URL schemes.
//!
//! A scheme such as `http://*.flickr.com/*` is translated into an anchored,
//! case-insensitive regular expression. Every character of the scheme other
//! than the `*` wildcard is matched literally, so `.` only ever matches a dot.

use std::fmt;

use once_cell::sync::OnceCell;
use oembed_types::OEmbedError;
use rand::{Rng, distributions::Alphanumeric};
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Wildcard token accepted in provider URL schemes.
pub const WILDCARD: &str = "*";

const SUBDOMAIN_WILDCARD: &str = "://*.";
const PLACEHOLDER_LEN: usize = 32;

/// A compiled provider URL scheme.
///
/// The regex is built on the first call to [`UrlPattern::matches`] and cached
/// for the lifetime of the pattern.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    compiled: OnceCell<Option<Regex>>,
}

impl UrlPattern {
    /// Accepts a provider URL scheme.
    ///
    /// # Errors
    /// Returns [`OEmbedError::InvalidPattern`] when the scheme is empty.
    pub fn compile(scheme: impl Into<String>) -> Result<Self, OEmbedError> {
        let source = scheme.into();
        if source.trim().is_empty() {
            return Err(OEmbedError::InvalidPattern {
                scheme: source,
                reason: "the scheme cannot be empty".to_string(),
            });
        }
        Ok(Self {
            source,
            compiled: OnceCell::new(),
        })
    }

    /// The scheme exactly as supplied.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `url` matches the whole scheme, ignoring case.
    pub fn matches(&self, url: &str) -> bool {
        self.regex().is_some_and(|regex| regex.is_match(url))
    }

    /// The compiled expression, or `None` if the scheme could not be compiled.
    pub fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| {
                let expression = format!("^{}$", regex_source_from_scheme(&self.source));
                match RegexBuilder::new(&expression).case_insensitive(true).build() {
                    Ok(regex) => Some(regex),
                    Err(error) => {
                        warn!(scheme = %self.source, error = %error, "failed to compile URL scheme; it will never match");
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for UrlPattern {}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<&str> for UrlPattern {
    type Error = OEmbedError;

    fn try_from(scheme: &str) -> Result<Self, Self::Error> {
        Self::compile(scheme)
    }
}

/// Unanchored regex body for a scheme.
///
/// Wildcards are first swapped for a random placeholder that does not occur in
/// the scheme, the remaining text is escaped, and the placeholder then becomes
/// `.*`. A wildcard sub-domain (`://*.`) is rewritten before the generic
/// wildcard so its trailing dot is absorbed instead of escaped as a literal.
pub fn regex_source_from_scheme(scheme: &str) -> String {
    let placeholder = unique_placeholder(scheme);
    let substituted = scheme
        .replace(SUBDOMAIN_WILDCARD, &format!("://{placeholder}"))
        .replace(WILDCARD, &placeholder);
    regex::escape(&substituted).replace(&placeholder, ".*")
}

fn unique_placeholder(scheme: &str) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(PLACEHOLDER_LEN)
            .map(char::from)
            .collect();
        if !scheme.contains(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scheme_is_rejected() {
        assert!(matches!(UrlPattern::compile(""), Err(OEmbedError::InvalidPattern { .. })));
        assert!(matches!(UrlPattern::compile("   "), Err(OEmbedError::InvalidPattern { .. })));
    }

    #[test]
    fn literal_dots_are_not_wildcards() {
        let pattern = UrlPattern::compile("http://a.b.com/x.html").unwrap();
        assert!(pattern.matches("http://a.b.com/x.html"));
        assert!(!pattern.matches("http://aXb.com/x.html"));
        assert!(!pattern.matches("http://a.b.com/xZhtml"));
        assert!(!pattern.matches("http://a.b.com/x.html/extra"));
        assert!(!pattern.matches("prefix-http://a.b.com/x.html"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let pattern = UrlPattern::compile("http://example.com/watch?v=(1)+[2]").unwrap();
        assert!(pattern.matches("http://example.com/watch?v=(1)+[2]"));
        assert!(!pattern.matches("http://example.com/watchv=11"));
    }

    #[test]
    fn subdomain_wildcard_absorbs_the_dot() {
        let pattern = UrlPattern::compile("http://*.example.com/*").unwrap();
        assert!(pattern.matches("http://a.example.com/x"));
        assert!(pattern.matches("http://deep.sub.example.com/a/b?c=d"));
        assert!(pattern.matches("http://example.com/"));
        assert!(pattern.matches("http://evilexample.com/x"));
        assert!(!pattern.matches("http://example.com"));
        assert!(!pattern.matches("https://a.example.com/x"));
    }

    #[test]
    fn matching_ignores_case_and_handles_unicode() {
        let pattern = UrlPattern::compile("http://*.Example.com/café/*").unwrap();
        assert!(pattern.matches("HTTP://WWW.EXAMPLE.COM/CAFÉ/menu"));
    }

    #[test]
    fn inner_wildcards_expand_to_any_text() {
        let pattern = UrlPattern::compile("http://www.slideshare.net/*/*").unwrap();
        assert!(pattern.matches("http://www.slideshare.net/user/deck"));
        assert!(!pattern.matches("http://www.slideshare.net/user"));
    }

    #[test]
    fn regex_source_escapes_then_expands() {
        assert_eq!(regex_source_from_scheme("http://*.flickr.com/*"), r"http://.*flickr\.com/.*");
        assert_eq!(regex_source_from_scheme("http://qik.com/video/*"), r"http://qik\.com/video/.*");
    }

    #[test]
    fn compiled_regex_is_cached() {
        let pattern = UrlPattern::compile("http://*.vimeo.com/*").unwrap();
        let first = pattern.regex().map(|regex| regex as *const Regex);
        let second = pattern.regex().map(|regex| regex as *const Regex);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(pattern.to_string(), "http://*.vimeo.com/*");
    }
}
