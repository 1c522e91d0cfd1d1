//! HTTP collaborator for the oEmbed consumer.
//!
//! Resolution needs exactly one capability from the network: a GET with a
//! bounded timeout, a bounded number of redirects, an optional User-Agent, and
//! a distinct failure for transport problems versus non-2xx statuses. That
//! capability is the [`HttpFetcher`] trait so the engine can be driven by an
//! in-memory fetcher in tests; [`ReqwestFetcher`] is the production
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use oembed_api::{FetchOptions, HttpFetcher, ReqwestFetcher};
//!
//! let response = ReqwestFetcher::new().get("http://www.youtube.com/oembed?url=...", &FetchOptions::default())?;
//! println!("status: {}", response.status);
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use anyhow::Context;
use oembed_types::OEmbedError;
use oembed_util::block_on_future;
use reqwest::{Client, header, redirect};
use tracing::debug;

mod static_fetcher;

pub use static_fetcher::{CannedResponse, StaticFetcher};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default number of redirects followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

const ACCEPT_HEADER: &str = "application/json, text/xml;q=0.9, text/html;q=0.8, */*;q=0.1";

/// User-Agent sent when the caller does not configure one.
pub fn default_user_agent() -> String {
    format!("oembed-rs/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS)
}

/// Per-request transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Zero disables redirect following; a 3xx response then fails as a status error.
    pub max_redirects: usize,
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: None,
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Blocking GET used by discovery and endpoint calls.
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url`.
    ///
    /// # Errors
    /// - [`OEmbedError::Transport`] when the request cannot complete
    /// - [`OEmbedError::HttpStatus`] when the final status is not 2xx
    fn get(&self, url: &str, options: &FetchOptions) -> Result<HttpResponse, OEmbedError>;
}

/// [`HttpFetcher`] backed by an async `reqwest` client driven to completion
/// through [`block_on_future`].
///
/// One client is built per distinct [`FetchOptions`] and reused, so discovery
/// and endpoint calls share pooled connections. Clones share the same clients.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    clients: Arc<Mutex<HashMap<FetchOptions, Client>>>,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Async form of [`HttpFetcher::get`] for callers already inside a runtime.
    pub async fn get_async(&self, url: &str, options: &FetchOptions) -> Result<HttpResponse, OEmbedError> {
        let client = self.client_for(url, options)?;
        send_get(client, url.to_string()).await
    }

    fn client_for(&self, url: &str, options: &FetchOptions) -> Result<Client, OEmbedError> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(options) {
            return Ok(client.clone());
        }
        let client = build_client(options).map_err(|error| transport_error(url, format!("{error:#}")))?;
        debug!(timeout = ?options.timeout, max_redirects = options.max_redirects, "built http client");
        clients.insert(options.clone(), client.clone());
        Ok(client)
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &str, options: &FetchOptions) -> Result<HttpResponse, OEmbedError> {
        let client = self.client_for(url, options)?;
        let owned_url = url.to_string();
        block_on_future(async move { Ok(send_get(client, owned_url).await) })
            .map_err(|error| transport_error(url, format!("{error:#}")))?
    }
}

fn build_client(options: &FetchOptions) -> anyhow::Result<Client> {
    let mut default_headers = header::HeaderMap::new();
    default_headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_HEADER));

    let redirect_policy = if options.max_redirects == 0 {
        redirect::Policy::none()
    } else {
        redirect::Policy::limited(options.max_redirects)
    };
    let user_agent = options.user_agent.clone().unwrap_or_else(default_user_agent);

    Client::builder()
        .default_headers(default_headers)
        .user_agent(user_agent)
        .timeout(options.timeout)
        .connect_timeout(options.timeout)
        .redirect(redirect_policy)
        .build()
        .context("build http client")
}

async fn send_get(client: Client, url: String) -> Result<HttpResponse, OEmbedError> {
    debug!(%url, "sending GET");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|error| transport_error(&url, describe_request_error(&error)))?;

    let status = response.status();
    if !status.is_success() {
        debug!(%url, status = status.as_u16(), "non-success status");
        return Err(OEmbedError::HttpStatus {
            url,
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|error| transport_error(&url, format!("failed to read response body: {error}")))?;
    debug!(%url, status = status.as_u16(), body_len = body.len(), "GET completed");
    Ok(HttpResponse {
        status: status.as_u16(),
        body,
    })
}

fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("timed out: {error}")
    } else if error.is_redirect() {
        format!("redirect limit exceeded: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        format!("network error: {error}")
    }
}

fn transport_error(url: &str, message: String) -> OEmbedError {
    OEmbedError::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "multi_thread")]
    async fn returns_body_for_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let response = ReqwestFetcher::new()
            .get(&format!("{}/page", server.uri()), &FetchOptions::default())
            .expect("fetch succeeds");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<html></html>");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_success_status_is_distinct_from_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let error = ReqwestFetcher::new()
            .get(&format!("{}/missing", server.uri()), &FetchOptions::default())
            .unwrap_err();
        assert!(matches!(error, OEmbedError::HttpStatus { status: 404, .. }), "got {error:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn redirects_are_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/moved"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/final"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/final"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let url = format!("{}/moved", server.uri());
        let followed = ReqwestFetcher::new().get(&url, &FetchOptions::default()).unwrap();
        assert_eq!(followed.body, "ok");

        let no_redirects = FetchOptions {
            max_redirects: 0,
            ..FetchOptions::default()
        };
        let error = ReqwestFetcher::new().get(&url, &no_redirects).unwrap_err();
        assert!(matches!(error, OEmbedError::HttpStatus { status: 302, .. }), "got {error:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn async_get_sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::header("user-agent", "custom-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let options = FetchOptions {
            user_agent: Some("custom-agent/1.0".to_string()),
            ..FetchOptions::default()
        };
        let response = ReqwestFetcher::new().get_async(&server.uri(), &options).await.unwrap();
        assert_eq!(response.body, "hello");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clients_are_reused_per_fetch_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = ReqwestFetcher::new();
        let defaults = FetchOptions::default();
        let short_timeout = FetchOptions {
            timeout: Duration::from_secs(1),
            ..FetchOptions::default()
        };
        fetcher.get(&format!("{}/page", server.uri()), &defaults).unwrap();
        fetcher.clone().get(&format!("{}/oembed", server.uri()), &defaults).unwrap();
        fetcher.get(&server.uri(), &short_timeout).unwrap();

        assert_eq!(fetcher.clients.lock().unwrap().len(), 2);
    }

    #[test]
    fn connection_refused_is_a_transport_error() {
        let error = ReqwestFetcher::new()
            .get("http://127.0.0.1:9/", &FetchOptions::default())
            .unwrap_err();
        assert!(error.is_fetch_failure());
        assert!(matches!(error, OEmbedError::Transport { .. }), "got {error:?}");
    }
}
