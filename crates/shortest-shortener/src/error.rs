use shortest_core::{StoreError, WindowExhausted};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("{0}")]
    InvalidUrl(String),
    #[error("long url not found")]
    NotFound,
    #[error("slug windows exhausted: {0}")]
    WindowExhausted(#[from] WindowExhausted),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("operation cancelled")]
    Cancelled,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
