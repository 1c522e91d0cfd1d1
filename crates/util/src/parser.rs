//! # Response Parsing
//!
//! Turns an endpoint response body into the generic attribute bag consumed by
//! [`oembed_types::EmbedObject::create`]. JSON bodies must be a single object.
//! XML bodies follow the flat oEmbed layout:
//!
//! ```text
//! <oembed>
//!   <type>photo</type>
//!   <version>1.0</version>
//!   ...
//! </oembed>
//! ```
//!
//! Each direct child of the root element becomes a string attribute.

use oembed_types::{Attributes, OEmbedError, ResponseFormat};
use quick_xml::{Reader, events::Event};
use serde_json::Value;

const BODY_PREVIEW_LIMIT: usize = 200;

/// Parse a response body declared as `format` into an attribute bag.
///
/// # Errors
/// Returns [`OEmbedError::Parse`] with a truncated, whitespace-collapsed preview
/// of the body when the document is malformed or is not an object.
pub fn parse_response(body: &str, format: ResponseFormat) -> Result<Attributes, OEmbedError> {
    let parsed = match format {
        ResponseFormat::Json => parse_json_object(body),
        ResponseFormat::Xml => parse_xml_object(body),
    };
    parsed.map_err(|message| OEmbedError::Parse {
        format,
        message,
        body_preview: truncate_response_preview(body, BODY_PREVIEW_LIMIT),
    })
}

fn parse_json_object(body: &str) -> Result<Attributes, String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("response is not a JSON object".to_string()),
        Err(error) => Err(error.to_string()),
    }
}

fn parse_xml_object(body: &str) -> Result<Attributes, String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut attributes = Attributes::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut current_field: Option<String> = None;
    let mut current_text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|error| format!("malformed XML at byte {}: {}", reader.error_position(), error))?;
        match event {
            Event::Start(start) => {
                depth += 1;
                if depth == 1 {
                    saw_root = true;
                } else if depth == 2 {
                    current_field = Some(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
                    current_text.clear();
                }
            }
            Event::Empty(_) if depth == 0 => saw_root = true,
            Event::Text(text) if depth == 2 => {
                let unescaped = text.unescape().map_err(|error| error.to_string())?;
                current_text.push_str(&unescaped);
            }
            Event::CData(data) if depth == 2 => {
                current_text.push_str(&String::from_utf8_lossy(&data.into_inner()));
            }
            Event::End(_) => {
                if depth == 2
                    && let Some(field) = current_field.take()
                {
                    attributes.insert(field, Value::String(std::mem::take(&mut current_text)));
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err("XML document has no root element".to_string());
    }
    Ok(attributes)
}

/// Collapse whitespace and truncate a body for inclusion in error messages.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}
