//! Typed embed objects materialized from provider responses.
//!
//! A provider response is a flat attribute bag. [`EmbedObject::create`] dispatches
//! on its `type` attribute through a closed lookup ([`EmbedKind::from_type_name`]),
//! validates the fields each variant requires, and keeps the complete bag so any
//! provider-specific attribute stays reachable through [`EmbedObject::get`].

use std::{borrow::Cow, collections::HashMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

use crate::error::{ObjectError, OEmbedError, Result};

/// Raw attribute bag returned by a provider, keyed by attribute name.
pub type Attributes = JsonMap<String, Value>;

/// Attribute every variant requires, whatever its own declared fields are.
pub const VERSION_FIELD: &str = "version";

/// Attribute holding the variant discriminator.
pub const TYPE_FIELD: &str = "type";

/// Discriminator of the four oEmbed response variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    Photo,
    Video,
    Link,
    Rich,
}

impl EmbedKind {
    /// Maps a payload `type` value to its variant. The lookup is exact and case-sensitive.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "photo" => Some(Self::Photo),
            "video" => Some(Self::Video),
            "link" => Some(Self::Link),
            "rich" => Some(Self::Rich),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Link => "link",
            Self::Rich => "rich",
        }
    }

    /// Fields declared by the variant itself, excluding `version`.
    pub fn declared_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Photo => &["url", "width", "height"],
            Self::Rich => &["html", "width", "height"],
            Self::Video | Self::Link => &[],
        }
    }

    /// Full required-field list in validation order: declared fields, then `version`.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.declared_fields().iter().copied().chain(std::iter::once(VERSION_FIELD))
    }
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image embed. Requires `url`, `width` and `height`.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub version: String,
    pub url: String,
    pub width: String,
    pub height: String,
    attributes: Attributes,
}

/// Playable video embed. Conventionally carries `html`, `width` and `height`, none required.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub version: String,
    attributes: Attributes,
}

/// Plain link embed with no required fields beyond `version`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub version: String,
    attributes: Attributes,
}

/// Rich HTML embed. Requires `html`, `width` and `height`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rich {
    pub version: String,
    pub html: String,
    pub width: String,
    pub height: String,
    attributes: Attributes,
}

impl Photo {
    pub fn width_px(&self) -> Option<u32> {
        parse_pixels(&self.width)
    }

    pub fn height_px(&self) -> Option<u32> {
        parse_pixels(&self.height)
    }
}

impl Rich {
    pub fn width_px(&self) -> Option<u32> {
        parse_pixels(&self.width)
    }

    pub fn height_px(&self) -> Option<u32> {
        parse_pixels(&self.height)
    }
}

/// A validated oEmbed response.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedObject {
    Photo(Photo),
    Video(Video),
    Link(Link),
    Rich(Rich),
}

impl EmbedObject {
    /// Builds the variant named by the payload's `type` attribute.
    ///
    /// # Errors
    /// - [`ObjectError::MissingType`] when `type` is absent or null
    /// - [`OEmbedError::NoSupport`] when `type` is not photo, video, link or rich
    /// - [`ObjectError::MissingField`] naming the first absent required attribute
    pub fn create(payload: Attributes) -> Result<Self> {
        let type_name = payload
            .get(TYPE_FIELD)
            .and_then(attribute_text)
            .ok_or(ObjectError::MissingType)?;
        let kind = EmbedKind::from_type_name(type_name.as_ref()).ok_or_else(|| OEmbedError::NoSupport {
            kind: type_name.clone().into_owned(),
        })?;

        let mut required = RequiredFields::collect(kind, &payload)?;
        let version = required.take(VERSION_FIELD);
        let object = match kind {
            EmbedKind::Photo => Self::Photo(Photo {
                version,
                url: required.take("url"),
                width: required.take("width"),
                height: required.take("height"),
                attributes: payload,
            }),
            EmbedKind::Video => Self::Video(Video {
                version,
                attributes: payload,
            }),
            EmbedKind::Link => Self::Link(Link {
                version,
                attributes: payload,
            }),
            EmbedKind::Rich => Self::Rich(Rich {
                version,
                html: required.take("html"),
                width: required.take("width"),
                height: required.take("height"),
                attributes: payload,
            }),
        };
        Ok(object)
    }

    /// Same as [`EmbedObject::create`] for an arbitrary JSON value. Non-object
    /// values carry no `type` and are rejected as such.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(payload) => Self::create(payload),
            _ => Err(ObjectError::MissingType.into()),
        }
    }

    pub fn kind(&self) -> EmbedKind {
        match self {
            Self::Photo(_) => EmbedKind::Photo,
            Self::Video(_) => EmbedKind::Video,
            Self::Link(_) => EmbedKind::Link,
            Self::Rich(_) => EmbedKind::Rich,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Self::Photo(photo) => &photo.version,
            Self::Video(video) => &video.version,
            Self::Link(link) => &link.version,
            Self::Rich(rich) => &rich.version,
        }
    }

    /// The complete attribute bag the object was built from.
    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Photo(photo) => &photo.attributes,
            Self::Video(video) => &video.attributes,
            Self::Link(link) => &link.attributes,
            Self::Rich(rich) => &rich.attributes,
        }
    }

    /// Pass-through attribute lookup. Absent and null attributes both yield `None`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes().get(name).filter(|value| !value.is_null())
    }

    /// Attribute rendered as text; numbers and booleans are stringified.
    pub fn get_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).and_then(attribute_text)
    }

    pub fn title(&self) -> Option<Cow<'_, str>> {
        self.get_text("title")
    }

    pub fn author_name(&self) -> Option<Cow<'_, str>> {
        self.get_text("author_name")
    }

    pub fn provider_name(&self) -> Option<Cow<'_, str>> {
        self.get_text("provider_name")
    }

    pub fn thumbnail_url(&self) -> Option<Cow<'_, str>> {
        self.get_text("thumbnail_url")
    }

    /// Seconds the consumer may cache the response, when the provider states it.
    pub fn cache_age(&self) -> Option<u64> {
        self.get_text("cache_age").and_then(|age| age.trim().parse().ok())
    }

    /// Canonical markup for direct display.
    ///
    /// Photo renders an `<img>` tag, Link an `<a>` tag, Rich its `html` verbatim.
    /// Video has no canonical rendering; its `html` attribute is returned when present.
    pub fn render(&self) -> String {
        match self {
            Self::Photo(photo) => format!(
                r#"<img src="{}" width="{}" height="{}" alt="{}" />"#,
                escape_attribute(&photo.url),
                escape_attribute(&photo.width),
                escape_attribute(&photo.height),
                escape_attribute(&self.title().unwrap_or_default()),
            ),
            Self::Link(_) => format!(
                r#"<a href="{}">{}</a>"#,
                escape_attribute(&self.get_text("url").unwrap_or_default()),
                escape_attribute(&self.title().unwrap_or_default()),
            ),
            Self::Rich(rich) => rich.html.clone(),
            Self::Video(_) => self.get_text("html").map(Cow::into_owned).unwrap_or_default(),
        }
    }
}

impl fmt::Display for EmbedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl TryFrom<Attributes> for EmbedObject {
    type Error = OEmbedError;

    fn try_from(payload: Attributes) -> Result<Self> {
        Self::create(payload)
    }
}

/// Required attribute values of one variant, validated up front.
struct RequiredFields {
    values: HashMap<&'static str, String>,
}

impl RequiredFields {
    fn collect(kind: EmbedKind, payload: &Attributes) -> Result<Self, ObjectError> {
        let mut values = HashMap::new();
        for field in kind.required_fields() {
            let value = payload
                .get(field)
                .and_then(attribute_text)
                .ok_or_else(|| ObjectError::MissingField {
                    kind,
                    field: field.to_string(),
                })?;
            values.insert(field, value.into_owned());
        }
        Ok(Self { values })
    }

    fn take(&mut self, field: &'static str) -> String {
        self.values.remove(field).unwrap_or_default()
    }
}

/// Text form of a scalar attribute. Null is treated as absent.
pub fn attribute_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

fn parse_pixels(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    trimmed
        .parse::<u32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|px| px.is_finite() && *px >= 0.0).map(|px| px as u32))
}

fn escape_attribute(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
