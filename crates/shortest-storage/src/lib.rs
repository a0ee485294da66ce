//! Mapping store backends: an in-memory double and a Redis store.

pub mod memory;
pub mod redis;

pub use memory::InMemoryStore;
pub use redis::RedisStore;
pub use shortest_core::{MappingStore, SetOutcome, StoreError};
