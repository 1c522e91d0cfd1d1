use oembed_types::OEmbedError;
use tracing::debug;

use crate::{RegistryConfig, provider::Provider, providers::default_providers};

/// Ordered provider collection. Insertion order is match priority.
///
/// The registry is a plain vector with no internal synchronization; callers
/// sharing one across threads must wrap it themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// An empty registry; every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the built-in providers.
    pub fn with_defaults() -> Self {
        Self {
            providers: default_providers(),
        }
    }

    /// Builds a registry from a config: built-ins first (unless disabled), then
    /// the configured providers in file order.
    ///
    /// # Errors
    /// Returns [`OEmbedError::InvalidPattern`] if a configured provider carries an empty scheme.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, OEmbedError> {
        let mut registry = if config.include_defaults {
            Self::with_defaults()
        } else {
            Self::new()
        };
        for definition in &config.providers {
            registry.add(Provider::try_from(definition.clone())?);
        }
        debug!(provider_count = registry.len(), "provider registry built from config");
        Ok(registry)
    }

    /// Appends a provider with the lowest priority.
    pub fn add(&mut self, provider: Provider) {
        self.providers.push(provider);
    }

    /// Removes every provider equal to `provider`; returns whether any was removed.
    pub fn remove(&mut self, provider: &Provider) -> bool {
        let before = self.providers.len();
        self.providers.retain(|existing| existing != provider);
        self.providers.len() != before
    }

    /// Removes the first provider with the given name.
    pub fn remove_by_name(&mut self, name: &str) -> Option<Provider> {
        let index = self.providers.iter().position(|provider| provider.name() == name)?;
        Some(self.providers.remove(index))
    }

    pub fn clear(&mut self) {
        self.providers.clear();
    }

    pub fn list(&self) -> &[Provider] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First provider, in insertion order, whose schemes claim `url`.
    pub fn find_match(&self, url: &str) -> Option<&Provider> {
        let found = self.providers.iter().find(|provider| provider.matches(url));
        match found {
            Some(provider) => debug!(%url, provider = provider.name(), "provider registry match"),
            None => debug!(%url, provider_count = self.providers.len(), "no registered provider matches"),
        }
        found
    }
}

impl FromIterator<Provider> for ProviderRegistry {
    fn from_iter<T: IntoIterator<Item = Provider>>(iter: T) -> Self {
        Self {
            providers: iter.into_iter().collect(),
        }
    }
}

impl Extend<Provider> for ProviderRegistry {
    fn extend<T: IntoIterator<Item = Provider>>(&mut self, iter: T) {
        self.providers.extend(iter);
    }
}
