//! Error taxonomy shared by every crate in the workspace.
//!
//! Every failure surfaced by a resolution attempt is terminal for that attempt:
//! nothing in the library retries internally, and no partially-built embed
//! object is ever returned.

use thiserror::Error;

use crate::{EmbedKind, ResponseFormat};

/// Result alias used throughout the library crates.
pub type Result<T, E = OEmbedError> = std::result::Result<T, E>;

/// Top-level error returned by registry, discovery, fetch and factory operations.
#[derive(Debug, Error)]
pub enum OEmbedError {
    /// The resource URL failed basic structural validation.
    #[error("the URL \"{url}\" is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A provider URL scheme was empty or malformed.
    #[error("invalid URL scheme pattern \"{scheme}\": {reason}")]
    InvalidPattern { scheme: String, reason: String },

    /// The HTTP request could not be completed (DNS, connect, timeout, redirect limit, body read).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The HTTP request completed with an unacceptable status code.
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The resource page did not advertise a usable oEmbed endpoint.
    #[error("oEmbed discovery failed for {url}: {reason}")]
    Discovery { url: String, reason: String },

    /// Neither the provider registry nor discovery produced an endpoint.
    #[error("no oEmbed endpoint found for {url}")]
    NoEndpointFound {
        url: String,
        #[source]
        source: Option<Box<OEmbedError>>,
    },

    /// The endpoint response body could not be parsed in the declared format.
    #[error("could not parse {format} response: {message}. body preview: {body_preview}")]
    Parse {
        format: ResponseFormat,
        message: String,
        body_preview: String,
    },

    /// The payload is missing its type or a required attribute.
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// The payload names a type outside the known variant set.
    #[error("the object type \"{kind}\" is unknown or invalid")]
    NoSupport { kind: String },
}

/// Validation failure raised while materializing an embed object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("the object has no type")]
    MissingType,
    #[error("{kind} object is missing required \"{field}\" attribute")]
    MissingField { kind: EmbedKind, field: String },
}

impl OEmbedError {
    /// Name of the missing field when this is an [`ObjectError::MissingField`].
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            Self::Object(ObjectError::MissingField { field, .. }) => Some(field.as_str()),
            _ => None,
        }
    }

    /// True for failures produced by the HTTP collaborator.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}
