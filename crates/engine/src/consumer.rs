//! Public entry point: resolve a resource URL into an [`EmbedObject`].

use std::{fmt, sync::Arc};

use oembed_api::{HttpFetcher, ReqwestFetcher};
use oembed_registry::{ProviderRegistry, load_registry};
use oembed_types::{Attributes, EmbedObject, OEmbedError};
use oembed_util::{RequestParams, build_request_url, merged_params, parse_response, requested_format, validate_resource_url};
use tracing::{debug, info, warn};

use crate::{
    config::ConsumerConfig,
    discovery::Discoverer,
    resolver::{ResolvedEndpoint, resolve_endpoint},
};

/// Per-call resolution options.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Endpoint to call directly, bypassing the registry and discovery.
    pub endpoint: Option<String>,
    /// Extra query parameters such as `maxwidth`; they override parameters
    /// already present on the endpoint URL.
    pub parameters: RequestParams,
    /// Registry used instead of the consumer's own for this call.
    pub providers: Option<ProviderRegistry>,
    pub discovery: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            parameters: RequestParams::new(),
            providers: None,
            discovery: true,
        }
    }
}

impl ResolveOptions {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn without_discovery(mut self) -> Self {
        self.discovery = false;
        self
    }
}

/// Resolves resource URLs against a provider registry, falling back to
/// discovery, and materializes the endpoint response.
///
/// The discovery cache lives as long as the consumer.
pub struct Consumer {
    registry: ProviderRegistry,
    discoverer: Discoverer,
    fetcher: Arc<dyn HttpFetcher>,
    config: ConsumerConfig,
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("providers", &self.registry.len())
            .field("discoverer", &self.discoverer)
            .field("config", &self.config)
            .finish()
    }
}

impl Consumer {
    /// Consumer over the built-in providers using the network fetcher.
    pub fn new(config: ConsumerConfig) -> Self {
        Self::with_fetcher(config, ProviderRegistry::with_defaults(), Arc::new(ReqwestFetcher::new()))
    }

    pub fn with_fetcher(config: ConsumerConfig, registry: ProviderRegistry, fetcher: Arc<dyn HttpFetcher>) -> Self {
        let discoverer = Discoverer::new(fetcher.clone(), config.fetch_options())
            .with_preferred_format(config.preferred_format)
            .with_tie_break(config.tie_break);
        Self {
            registry,
            discoverer,
            fetcher,
            config,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.registry
    }

    pub fn discoverer(&self) -> &Discoverer {
        &self.discoverer
    }

    pub fn discoverer_mut(&mut self) -> &mut Discoverer {
        &mut self.discoverer
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Endpoint that [`Consumer::resolve`] would call for `resource_url`.
    /// Surrounding whitespace in `resource_url` is ignored.
    ///
    /// # Errors
    /// See [`resolve_endpoint`].
    pub fn resolve_endpoint(&mut self, resource_url: &str, options: &ResolveOptions) -> Result<ResolvedEndpoint, OEmbedError> {
        let resource_url = resource_url.trim();
        if let Some(endpoint) = &options.endpoint {
            return Ok(ResolvedEndpoint::explicit(endpoint.clone()));
        }
        let registry = options.providers.as_ref().unwrap_or(&self.registry);
        let discoverer = options.discovery.then_some(&mut self.discoverer);
        resolve_endpoint(resource_url, registry, discoverer)
    }

    /// Call the endpoint for `resource_url` and return the parsed attributes
    /// without materializing them.
    ///
    /// # Errors
    /// Validation, resolution, transport and parse failures.
    pub fn fetch_attributes(
        &mut self,
        resource_url: &str,
        options: &ResolveOptions,
    ) -> Result<(ResolvedEndpoint, Attributes), OEmbedError> {
        let resource_url = resource_url.trim();
        validate_resource_url(resource_url)?;
        let resolved = self.resolve_endpoint(resource_url, options)?;

        let format = requested_format(&merged_params(&resolved.endpoint, &options.parameters))?;
        let request_url = build_request_url(&resolved.endpoint, resource_url, &options.parameters);
        info!(url = %resource_url, endpoint = %resolved.endpoint, source = %resolved.source, %format, "requesting oEmbed");

        let response = self.fetcher.get(&request_url, &self.config.fetch_options())?;
        let attributes = parse_response(&response.body, format)?;
        Ok((resolved, attributes))
    }

    /// Resolve `resource_url` into an embed object.
    ///
    /// # Errors
    /// - [`OEmbedError::InvalidUrl`] for a malformed resource URL
    /// - [`OEmbedError::NoEndpointFound`] when no endpoint can be determined
    /// - [`OEmbedError::Transport`] / [`OEmbedError::HttpStatus`] for failed fetches
    /// - [`OEmbedError::Parse`], [`OEmbedError::Object`], [`OEmbedError::NoSupport`] for bad payloads
    pub fn resolve(&mut self, resource_url: &str, options: &ResolveOptions) -> Result<EmbedObject, OEmbedError> {
        let (_, attributes) = self.fetch_attributes(resource_url, options)?;
        let object = EmbedObject::create(attributes)?;
        debug!(url = %resource_url, kind = %object.kind(), "embed object created");
        Ok(object)
    }
}

/// One-shot resolution with environment config and the configured registry.
///
/// # Errors
/// See [`Consumer::resolve`].
pub fn resolve(resource_url: &str, options: &ResolveOptions) -> Result<EmbedObject, OEmbedError> {
    let registry = load_registry().unwrap_or_else(|error| {
        warn!(error = %format!("{error:#}"), "failed to load provider registry; using built-in providers");
        ProviderRegistry::with_defaults()
    });
    let mut consumer = Consumer::with_fetcher(ConsumerConfig::from_env(), registry, Arc::new(ReqwestFetcher::new()));
    consumer.resolve(resource_url, options)
}
