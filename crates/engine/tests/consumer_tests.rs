use std::sync::Arc;

use oembed_api::{ReqwestFetcher, StaticFetcher};
use oembed_engine::{Consumer, ConsumerConfig, EndpointSource, ResolveOptions, TieBreak};
use oembed_registry::{Provider, ProviderRegistry};
use oembed_types::{EmbedKind, OEmbedError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "http://blog.example/2024/post";

fn discovery_page(links: &[(&str, &str)]) -> String {
    let tags: String = links
        .iter()
        .map(|(media_type, href)| format!(r#"<link rel="alternate" type="{media_type}+oembed" href="{href}" />"#))
        .collect();
    format!("<html><head><title>post</title>{tags}</head><body></body></html>")
}

fn consumer_with(fetcher: Arc<StaticFetcher>, config: ConsumerConfig) -> Consumer {
    Consumer::with_fetcher(config, ProviderRegistry::with_defaults(), fetcher)
}

#[test]
fn discovered_endpoint_is_called_and_cached() {
    let endpoint_request = "http://blog.example/oembed?url=http%3A%2F%2Fblog.example%2F2024%2Fpost&format=json";
    let body = json!({
        "type": "rich",
        "version": "1.0",
        "html": "<blockquote>post</blockquote>",
        "width": 500,
        "height": 300,
        "provider_name": "Blog",
    });
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_body(PAGE, 200, discovery_page(&[("application/json", "http://blog.example/oembed")]))
            .with_body(endpoint_request, 200, body.to_string()),
    );
    let mut consumer = consumer_with(fetcher.clone(), ConsumerConfig::default());

    let first = consumer.resolve(PAGE, &ResolveOptions::default()).unwrap();
    assert_eq!(first.kind(), EmbedKind::Rich);
    assert_eq!(first.render(), "<blockquote>post</blockquote>");
    assert_eq!(first.provider_name().as_deref(), Some("Blog"));
    assert_eq!(consumer.discoverer().cached_endpoint(PAGE), Some("http://blog.example/oembed"));

    consumer.resolve(PAGE, &ResolveOptions::default()).unwrap();
    let page_fetches = fetcher.requests().iter().filter(|url| url.as_str() == PAGE).count();
    assert_eq!(page_fetches, 1, "page should be fetched once: {:?}", fetcher.requests());
}

#[test]
fn rich_payload_missing_height_fails() {
    let endpoint_request = "http://blog.example/oembed?url=http%3A%2F%2Fblog.example%2F2024%2Fpost&format=json";
    let body = json!({ "type": "rich", "version": "1.0", "html": "<p></p>", "width": 500, "height": null });
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_body(PAGE, 200, discovery_page(&[("application/json", "http://blog.example/oembed")]))
            .with_body(endpoint_request, 200, body.to_string()),
    );
    let error = consumer_with(fetcher, ConsumerConfig::default())
        .resolve(PAGE, &ResolveOptions::default())
        .unwrap_err();
    assert_eq!(error.missing_field(), Some("height"));
}

#[test]
fn tie_break_selects_xml_link() {
    let page = discovery_page(&[("text/xml", "http://blog.example/first.xml"), ("text/xml", "http://blog.example/last.xml")]);
    let fetcher = Arc::new(StaticFetcher::new().with_body(PAGE, 200, page));

    let mut last = consumer_with(fetcher.clone(), ConsumerConfig::default());
    let resolved = last.resolve_endpoint(PAGE, &ResolveOptions::default()).unwrap();
    assert_eq!(resolved.endpoint, "http://blog.example/last.xml");
    assert_eq!(resolved.source, EndpointSource::Discovery);

    let config = ConsumerConfig {
        tie_break: TieBreak::First,
        ..ConsumerConfig::default()
    };
    let mut first = consumer_with(fetcher, config);
    let resolved = first.resolve_endpoint(PAGE, &ResolveOptions::default()).unwrap();
    assert_eq!(resolved.endpoint, "http://blog.example/first.xml");
}

#[test]
fn page_without_links_reports_no_endpoint() {
    let fetcher = Arc::new(StaticFetcher::new().with_body(PAGE, 200, "<html><head></head></html>"));
    let error = consumer_with(fetcher, ConsumerConfig::default())
        .resolve(PAGE, &ResolveOptions::default())
        .unwrap_err();
    match error {
        OEmbedError::NoEndpointFound { source: Some(source), .. } => {
            assert!(matches!(*source, OEmbedError::Discovery { .. }), "got {source:?}");
        }
        other => panic!("expected NoEndpointFound, got {other:?}"),
    }
}

#[test]
fn configured_provider_is_consulted_after_builtins() {
    let fetcher = Arc::new(StaticFetcher::new());
    let mut consumer = consumer_with(fetcher.clone(), ConsumerConfig::default());
    consumer
        .registry_mut()
        .add(Provider::new("http://blog.example/oembed", "Blog", None, ["http://blog.example/*"]).unwrap());

    let resolved = consumer.resolve_endpoint(PAGE, &ResolveOptions::default()).unwrap();
    assert_eq!(
        resolved.source,
        EndpointSource::Provider {
            name: "Blog".to_string()
        }
    );
    assert_eq!(fetcher.request_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn resolves_over_http_through_discovery() {
    let server = MockServer::start().await;
    let page_url = format!("{}/video/42", server.uri());
    let endpoint = format!("{}/oembed", server.uri());

    Mock::given(method("GET"))
        .and(path("/video/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(discovery_page(&[("application/json", endpoint.as_str())])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oembed"))
        .and(query_param("url", page_url.as_str()))
        .and(query_param("maxwidth", "320"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "video",
            "version": "1.0",
            "html": "<video></video>",
            "width": 320,
            "height": 180,
        })))
        .mount(&server)
        .await;

    let mut consumer = Consumer::with_fetcher(ConsumerConfig::default(), ProviderRegistry::new(), Arc::new(ReqwestFetcher::new()));
    let options = ResolveOptions::default().with_param("maxwidth", "320");
    let object = consumer.resolve(&page_url, &options).unwrap();
    assert_eq!(object.kind(), EmbedKind::Video);
    assert_eq!(object.render(), "<video></video>");
}
