use async_trait::async_trait;
use deadpool_redis::redis::{self, AsyncCommands, RedisError};
use deadpool_redis::{Config, Pool, Runtime};
use shortest_core::error::Result;
use shortest_core::{
    effective_ttl, MappingStore, SetOutcome, StoreError, MAX_TRANSACTION_ATTEMPTS,
};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default namespace for slug keys.
pub const DEFAULT_KEY_PREFIX: &str = "shortest:slug:";

/// A Redis implementation of [`MappingStore`].
///
/// `set_if_absent` runs `WATCH key; GET key; MULTI; SET key value; EXEC`.
/// A nil `EXEC` reply means another client touched the key after the
/// `WATCH`, and the whole sequence is re-run. Every transaction checks out
/// its own pooled connection, because `WATCH` state belongs to the
/// connection and must not be shared with concurrent requests.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StoreError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

fn map_pool_error(operation: &str, err: impl std::fmt::Display) -> StoreError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        StoreError::Timeout(message)
    } else {
        StoreError::Unavailable(message)
    }
}

/// `PSETEX` argument for a normalized ttl; sub-millisecond ttls round up.
fn ttl_millis(ttl: Duration) -> Result<u64> {
    u64::try_from(ttl.as_millis())
        .map(|millis| millis.max(1))
        .map_err(|_| StoreError::InvalidData(format!("ttl {ttl:?} is out of range")))
}

impl RedisStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: Pool) -> Self {
        Self::with_prefix(pool, DEFAULT_KEY_PREFIX)
    }

    /// Creates a store with a custom key prefix (e.g., "myapp:slug:").
    pub fn with_prefix(pool: Pool, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a pool against `redis_url` and checks the backend answers.
    ///
    /// Fails with [`StoreError::Unavailable`] if Redis cannot be reached.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Unavailable(format!("failed to create redis pool: {e}")))?;

        let store = Self::with_prefix(pool, key_prefix);
        store.ping().await?;
        Ok(store)
    }

    /// Sends a `PING` over a pooled connection.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to ping redis", e))?;
        Ok(())
    }

    fn key(&self, slug: &str) -> String {
        format!("{}{}", self.key_prefix, slug)
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| map_pool_error("failed to get redis connection", e))
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MappingStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let redis_key = self.key(key);
        trace!(key, "Fetching mapping from Redis");

        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(&redis_key)
            .await
            .map_err(|e| map_redis_error("failed to fetch value from redis", e))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<SetOutcome> {
        let redis_key = self.key(key);
        let ttl_millis = effective_ttl(ttl)?.map(ttl_millis).transpose()?;
        let mut conn = self.connection().await?;

        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            redis::cmd("WATCH")
                .arg(&redis_key)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| map_redis_error("failed to watch key", e))?;

            let existing = conn
                .get::<_, Option<String>>(&redis_key)
                .await
                .map_err(|e| map_redis_error("failed to fetch value from redis", e))?;

            if let Some(existing) = existing {
                redis::cmd("UNWATCH")
                    .query_async::<()>(&mut conn)
                    .await
                    .map_err(|e| map_redis_error("failed to unwatch key", e))?;

                let outcome = if existing == value {
                    SetOutcome::AlreadyStoredSame
                } else {
                    SetOutcome::Collision
                };
                trace!(key, ?outcome, "Key already holds a value");
                return Ok(outcome);
            }

            let mut pipe = redis::pipe();
            pipe.atomic();
            match ttl_millis {
                Some(millis) => {
                    pipe.pset_ex(&redis_key, value, millis).ignore();
                }
                None => {
                    pipe.set(&redis_key, value).ignore();
                }
            }

            let committed: Option<()> = pipe
                .query_async(&mut conn)
                .await
                .map_err(|e| map_redis_error("failed to execute transaction", e))?;

            if committed.is_some() {
                debug!(key, attempt, "Stored mapping in Redis");
                return Ok(SetOutcome::Stored);
            }

            trace!(key, attempt, "Watched key changed, retrying transaction");
        }

        warn!(key, "Optimistic transaction retries exhausted");
        Err(StoreError::RetryBudgetExhausted {
            key: key.to_owned(),
            attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }
}
