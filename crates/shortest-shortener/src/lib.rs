//! Encode/decode orchestration for the shortest URL shortener.
//!
//! [`ShortenerService`] derives slugs from URL digests, walks the digest
//! windows on collision, and records mappings through any
//! [`MappingStore`](shortest_core::MappingStore).

pub mod config;
pub mod error;
pub mod service;
pub mod shortener;
pub mod validate;

pub use config::{PublicBaseUrl, ShortenerConfig};
pub use error::ShortenerError;
pub use service::ShortenerService;
pub use shortener::Shortener;
