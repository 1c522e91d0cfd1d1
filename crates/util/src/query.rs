//! Endpoint request construction and resource URL validation.

use indexmap::IndexMap;
use oembed_types::{OEmbedError, ResponseFormat};
use url::{Url, form_urlencoded};

/// Query parameter carrying the resource URL.
pub const URL_PARAM: &str = "url";
/// Query parameter selecting the response format.
pub const FORMAT_PARAM: &str = "format";

/// Ordered request parameters; later inserts for an existing key replace its value in place.
pub type RequestParams = IndexMap<String, String>;

/// Build the URL used to call an oEmbed endpoint for `resource_url`.
///
/// Parameter precedence, lowest to highest:
/// 1. query parameters already present on `endpoint`
/// 2. `caller_params`
/// 3. defaults for `url` (the resource URL) and `format` (`json`), applied only when still absent
///
/// # Examples
/// ```rust
/// use oembed_util::{RequestParams, build_request_url};
///
/// let url = build_request_url("http://p.example/oembed?maxwidth=300", "http://r.example/a", &RequestParams::new());
/// assert_eq!(url, "http://p.example/oembed?maxwidth=300&url=http%3A%2F%2Fr.example%2Fa&format=json");
/// ```
pub fn build_request_url(endpoint: &str, resource_url: &str, caller_params: &RequestParams) -> String {
    let base = endpoint.split_once('?').map_or(endpoint, |(base, _)| base);
    let mut params = merged_params(endpoint, caller_params);
    params
        .entry(URL_PARAM.to_string())
        .or_insert_with(|| resource_url.to_string());
    params
        .entry(FORMAT_PARAM.to_string())
        .or_insert_with(|| ResponseFormat::Json.as_str().to_string());

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("{base}?{encoded}")
}

/// Read the `format` parameter of a request URL built by [`build_request_url`].
///
/// # Errors
/// Returns [`OEmbedError::Parse`] when the format is neither `json` nor `xml`.
pub fn requested_format(params: &RequestParams) -> Result<ResponseFormat, OEmbedError> {
    match params.get(FORMAT_PARAM) {
        None => Ok(ResponseFormat::Json),
        Some(value) => value.parse().map_err(|error: oembed_types::ParseResponseFormatError| OEmbedError::Parse {
            format: ResponseFormat::Json,
            message: error.to_string(),
            body_preview: "<not requested>".to_string(),
        }),
    }
}

/// Merge endpoint query parameters with caller parameters using the same
/// precedence as [`build_request_url`], without the defaults.
pub fn merged_params(endpoint: &str, caller_params: &RequestParams) -> RequestParams {
    let mut params = RequestParams::new();
    if let Some((_, query)) = endpoint.split_once('?') {
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
    }
    for (key, value) in caller_params {
        params.insert(key.clone(), value.clone());
    }
    params
}

/// Basic structural validation of a resource URL: it must parse as an absolute
/// URL with a host.
pub fn validate_resource_url(resource_url: &str) -> Result<Url, OEmbedError> {
    let invalid = |reason: String| OEmbedError::InvalidUrl {
        url: resource_url.to_string(),
        reason,
    };
    let parsed = Url::parse(resource_url.trim()).map_err(|error| invalid(error.to_string()))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL must include a host".to_string()));
    }
    Ok(parsed)
}
