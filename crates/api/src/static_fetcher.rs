//! In-memory [`HttpFetcher`] serving canned responses.
//!
//! Used by tests and offline callers to drive discovery and endpoint calls
//! without a network. Every requested URL is recorded in order.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use oembed_types::OEmbedError;

use crate::{FetchOptions, HttpFetcher, HttpResponse};

/// Outcome served for a registered URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CannedResponse {
    Body { status: u16, body: String },
    TransportFailure(String),
}

/// Fetcher that answers from a fixed URL → response table. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    routes: HashMap<String, CannedResponse>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.routes.insert(
            url.into(),
            CannedResponse::Body {
                status,
                body: body.into(),
            },
        );
        self
    }

    pub fn with_transport_failure(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes.insert(url.into(), CannedResponse::TransportFailure(message.into()));
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl HttpFetcher for StaticFetcher {
    fn get(&self, url: &str, _options: &FetchOptions) -> Result<HttpResponse, OEmbedError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        match self.routes.get(url) {
            Some(CannedResponse::Body { status, body }) if (200..300).contains(status) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(CannedResponse::Body { status, .. }) => Err(OEmbedError::HttpStatus {
                url: url.to_string(),
                status: *status,
            }),
            Some(CannedResponse::TransportFailure(message)) => Err(OEmbedError::Transport {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Err(OEmbedError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
