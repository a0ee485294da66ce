//! Core types and traits for the shortest URL shortener.
//!
//! This crate holds the pure pieces of slug derivation (digest and window
//! selection) together with the [`MappingStore`] capability shared by the
//! storage backends and the shortener service.

pub mod digest;
pub mod error;
pub mod slug;
pub mod store;
pub mod window;

pub use digest::Digest;
pub use error::{StoreError, WindowExhausted};
pub use slug::{InvalidSlug, Slug};
pub use store::{effective_ttl, MappingStore, SetOutcome, MAX_TRANSACTION_ATTEMPTS, MAX_TTL};
pub use window::{slug_at, SlugWindows};
