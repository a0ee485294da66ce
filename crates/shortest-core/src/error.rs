use thiserror::Error;

/// Result type for mapping store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out: {0}")]
    Timeout(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("store operation failed: {0}")]
    Operation(String),
    #[error("optimistic transaction on '{key}' aborted {attempts} times")]
    RetryBudgetExhausted { key: String, attempts: usize },
}

/// Every candidate window of a digest has been tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no slug window of length {length} at offset {attempt} in a {digest_len}-character digest")]
pub struct WindowExhausted {
    pub digest_len: usize,
    pub length: usize,
    pub attempt: usize,
}
