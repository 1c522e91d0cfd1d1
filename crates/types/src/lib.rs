//! Shared type definitions for the oEmbed consumer workspace.
//!
//! - [`EmbedObject`] and its four variants, built through [`EmbedObject::create`]
//! - [`OEmbedError`], the error taxonomy every crate returns
//! - [`ResponseFormat`], the wire formats an oEmbed endpoint can answer in

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod embed;
pub mod error;

pub use embed::{Attributes, EmbedKind, EmbedObject, Link, Photo, Rich, Video, attribute_text};
pub use error::{OEmbedError, ObjectError, Result};

/// Response serialization requested through the `format` query parameter.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Media type advertised in discovery `<link type="...+oembed">` tags.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "text/xml",
        }
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.to_ascii_lowercase().as_str() {
            "application/json" => Some(Self::Json),
            "text/xml" => Some(Self::Xml),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = ParseResponseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(ParseResponseFormatError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid response format '{0}'; expected 'json' or 'xml'")]
pub struct ParseResponseFormatError(pub String);
