//! Provider registry for the oEmbed consumer.
//!
//! This crate owns the static half of endpoint resolution: glob-style URL
//! schemes ([`UrlPattern`]), the providers that declare them ([`Provider`]),
//! the ordered first-match-wins collection of providers ([`ProviderRegistry`]),
//! the built-in provider set, and the optional JSON config that appends more.

pub mod config;
pub mod pattern;
pub mod provider;
pub mod providers;
pub mod registry;

pub use config::{REGISTRY_PATH_ENV, RegistryConfig, default_config_path};
pub use pattern::{UrlPattern, regex_source_from_scheme};
pub use provider::{Provider, ProviderDefinition};
pub use providers::{BUILTIN_PROVIDERS, BuiltinProvider, default_providers};
pub use registry::ProviderRegistry;

/// Loads the registry described by the config file at [`default_config_path`].
///
/// # Errors
/// Fails when a configured provider declares an empty URL scheme.
pub fn load_registry() -> anyhow::Result<ProviderRegistry> {
    let config = RegistryConfig::load()?;
    let registry = ProviderRegistry::from_config(&config)?;
    Ok(registry)
}
