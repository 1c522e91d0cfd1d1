//! # oEmbed Engine
//!
//! Turns a resource URL into an [`EmbedObject`](oembed_types::EmbedObject):
//! it selects the provider endpoint, falls back to page discovery, calls the
//! endpoint and materializes the payload.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oembed_engine::{Consumer, ConsumerConfig, ResolveOptions};
//!
//! let mut consumer = Consumer::new(ConsumerConfig::from_env());
//! let options = ResolveOptions::default().with_param("maxwidth", "480");
//! let object = consumer.resolve("http://www.youtube.com/watch?v=ReSxgDpAJwk", &options)?;
//! println!("{}", object.render());
//! # Ok::<(), oembed_types::OEmbedError>(())
//! ```
//!
//! ## Architecture
//!
//! - **`config`**: transport and discovery settings read from the environment
//! - **`discovery`**: `<link type="...+oembed">` extraction with a per-consumer cache
//! - **`resolver`**: registry lookup with discovery fallback
//! - **`consumer`**: the request pipeline and the one-shot [`resolve`] helper

pub mod config;
pub mod consumer;
pub mod discovery;
pub mod resolver;

pub use config::{ConsumerConfig, TieBreak};
pub use consumer::{Consumer, ResolveOptions, resolve};
pub use discovery::{DiscoveredLink, Discoverer, scan_links, select_endpoint};
pub use resolver::{EndpointSource, ResolvedEndpoint, resolve_endpoint};
