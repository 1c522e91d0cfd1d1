use oembed_types::OEmbedError;
use serde::{Deserialize, Serialize};

use crate::pattern::UrlPattern;

/// An oEmbed provider: an API endpoint plus the URL schemes it claims.
///
/// A provider without schemes claims every URL. Providers are immutable once
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    endpoint: String,
    name: String,
    website: Option<String>,
    patterns: Vec<UrlPattern>,
}

impl Provider {
    /// Builds a provider from raw URL schemes.
    ///
    /// # Errors
    /// Returns [`OEmbedError::InvalidPattern`] for the first empty scheme.
    pub fn new<I, S>(endpoint: impl Into<String>, name: impl Into<String>, website: Option<String>, schemes: I) -> Result<Self, OEmbedError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = schemes.into_iter().map(|scheme| UrlPattern::compile(scheme)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_patterns(endpoint, name, website, patterns))
    }

    pub fn from_patterns(endpoint: impl Into<String>, name: impl Into<String>, website: Option<String>, patterns: Vec<UrlPattern>) -> Self {
        Self {
            endpoint: endpoint.into(),
            name: name.into(),
            website,
            patterns,
        }
    }

    /// True when the provider has no schemes or any scheme matches `url`.
    pub fn matches(&self, url: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|pattern| pattern.matches(url))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    /// Serializable description of this provider.
    pub fn to_definition(&self) -> ProviderDefinition {
        ProviderDefinition {
            name: self.name.clone(),
            endpoint: self.endpoint.clone(),
            url: self.website.clone(),
            schemes: self.patterns.iter().map(|pattern| pattern.source().to_string()).collect(),
        }
    }
}

/// Provider description as stored in the registry config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDefinition {
    pub name: String,
    pub endpoint: String,
    /// Provider website.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
}

impl TryFrom<ProviderDefinition> for Provider {
    type Error = OEmbedError;

    fn try_from(definition: ProviderDefinition) -> Result<Self, Self::Error> {
        Provider::new(definition.endpoint, definition.name, definition.url, definition.schemes)
    }
}
