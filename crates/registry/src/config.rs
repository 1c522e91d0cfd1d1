use std::{convert::Infallible, env, io::Error, path::PathBuf};

use dirs_next::config_dir;
use oembed_util::expand_tilde;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::ProviderDefinition;

/// Environment variable overriding the registry config file location.
pub const REGISTRY_PATH_ENV: &str = "OEMBED_REGISTRY_PATH";

/// Extra providers loaded from `providers.json`.
///
/// ```json
/// {
///   "include_defaults": true,
///   "providers": [
///     { "name": "Example", "endpoint": "https://example.com/oembed", "schemes": ["https://example.com/v/*"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Seed the built-in providers ahead of the configured ones.
    #[serde(default = "default_include_defaults")]
    pub include_defaults: bool,
    #[serde(default)]
    pub providers: Vec<ProviderDefinition>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            providers: Vec::new(),
        }
    }
}

fn default_include_defaults() -> bool {
    true
}

impl RegistryConfig {
    /// Loads the config from [`default_config_path`]. A missing or unreadable
    /// file yields the default config.
    pub fn load() -> Result<Self, Infallible> {
        Self::load_from(default_config_path())
    }

    pub fn load_from(path: PathBuf) -> Result<Self, Infallible> {
        let Ok(content) = std::fs::read_to_string(&path) else {
            debug!(path = %path.display(), "no registry config file; using defaults");
            return Ok(RegistryConfig::default());
        };
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "failed to parse registry config; using defaults");
                Ok(RegistryConfig::default())
            }
        }
    }

    pub fn save_to(&self, path: PathBuf) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

/// Get the default path for the registry configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(REGISTRY_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("oembed")
        .join("providers.json")
}
