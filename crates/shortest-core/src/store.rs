use crate::error::{Result, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of times a conditional write re-runs its optimistic
/// transaction before giving up with
/// [`StoreError::RetryBudgetExhausted`](crate::StoreError::RetryBudgetExhausted).
pub const MAX_TRANSACTION_ATTEMPTS: usize = 5;

/// Longest mapping lifetime a store accepts.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Normalizes the `ttl` passed to [`MappingStore::set_if_absent`].
///
/// `None` and a zero duration both mean the entry never expires. A ttl
/// above [`MAX_TTL`] is rejected with [`StoreError::InvalidData`].
pub fn effective_ttl(ttl: Option<Duration>) -> Result<Option<Duration>> {
    match ttl {
        Some(ttl) if ttl > MAX_TTL => Err(StoreError::InvalidData(format!(
            "ttl {ttl:?} exceeds the maximum of {MAX_TTL:?}"
        ))),
        Some(ttl) if !ttl.is_zero() => Ok(Some(ttl)),
        _ => Ok(None),
    }
}

/// Result of a [`MappingStore::set_if_absent`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The key was absent and the value is now recorded.
    Stored,
    /// The key already held the very same value. Nothing was written.
    AlreadyStoredSame,
    /// The key already held a different value. Nothing was written.
    Collision,
}

impl SetOutcome {
    /// Whether the key now maps to the caller's value.
    pub fn is_success(self) -> bool {
        matches!(self, SetOutcome::Stored | SetOutcome::AlreadyStoredSame)
    }
}

/// The shared slug → URL mapping.
///
/// Once a key is set its value never changes; only expiration removes it.
/// Implementations must make `set_if_absent` safe for unsynchronized callers
/// in separate processes, by running the read-decide-write sequence as an
/// optimistic transaction on the key rather than under a local lock.
#[async_trait]
pub trait MappingStore: Send + Sync + 'static {
    /// Returns the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is absent or has expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key` unless the key is already taken.
    ///
    /// A `ttl` of `None` or zero means the entry never expires; see
    /// [`effective_ttl`].
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<SetOutcome>;
}

#[async_trait]
impl<S: MappingStore + ?Sized> MappingStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<SetOutcome> {
        (**self).set_if_absent(key, value, ttl).await
    }
}
