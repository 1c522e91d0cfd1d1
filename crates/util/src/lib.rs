//! Utility helpers shared by the oEmbed consumer crates: the blocking bridge
//! over async HTTP, response body parsing, and endpoint query construction.

pub mod async_runtime;
pub mod parser;
pub mod path_processing;
pub mod query;

pub use async_runtime::block_on_future;
pub use parser::{parse_response, truncate_response_preview};
pub use path_processing::{expand_tilde, non_empty_env};
pub use query::{FORMAT_PARAM, RequestParams, URL_PARAM, build_request_url, merged_params, requested_format, validate_resource_url};
