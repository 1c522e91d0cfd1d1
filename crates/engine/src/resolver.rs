//! Endpoint selection: registry first, discovery as the fallback.

use std::fmt;

use oembed_registry::ProviderRegistry;
use oembed_types::OEmbedError;
use tracing::debug;

use crate::discovery::Discoverer;

/// Where a resolved endpoint came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSource {
    /// Supplied by the caller; neither the registry nor discovery was consulted.
    Explicit,
    Provider { name: String },
    Discovery,
}

impl fmt::Display for EndpointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Provider { name } => write!(f, "provider {name}"),
            Self::Discovery => f.write_str("discovery"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub endpoint: String,
    pub source: EndpointSource,
}

impl ResolvedEndpoint {
    pub fn explicit(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            source: EndpointSource::Explicit,
        }
    }
}

/// Find the endpoint for `url`: the first matching provider in `registry`,
/// otherwise the page's discovery link when `discoverer` is given.
///
/// # Errors
/// - [`OEmbedError::NoEndpointFound`] when no provider matches and discovery is
///   disabled or finds no usable link (the discovery failure is kept as the source)
/// - [`OEmbedError::Transport`] / [`OEmbedError::HttpStatus`] when the page fetch fails
pub fn resolve_endpoint(
    url: &str,
    registry: &ProviderRegistry,
    discoverer: Option<&mut Discoverer>,
) -> Result<ResolvedEndpoint, OEmbedError> {
    if let Some(provider) = registry.find_match(url) {
        return Ok(ResolvedEndpoint {
            endpoint: provider.endpoint().to_string(),
            source: EndpointSource::Provider {
                name: provider.name().to_string(),
            },
        });
    }

    let Some(discoverer) = discoverer else {
        debug!(%url, "no provider matched and discovery is disabled");
        return Err(OEmbedError::NoEndpointFound {
            url: url.to_string(),
            source: None,
        });
    };

    match discoverer.discover_endpoint(url) {
        Ok(endpoint) if !endpoint.trim().is_empty() => Ok(ResolvedEndpoint {
            endpoint,
            source: EndpointSource::Discovery,
        }),
        Ok(_) => Err(OEmbedError::NoEndpointFound {
            url: url.to_string(),
            source: None,
        }),
        Err(error @ OEmbedError::Discovery { .. }) => Err(OEmbedError::NoEndpointFound {
            url: url.to_string(),
            source: Some(Box::new(error)),
        }),
        Err(error) => Err(error),
    }
}
