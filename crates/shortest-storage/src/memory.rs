use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use shortest_core::error::Result;
use shortest_core::{
    effective_ttl, MappingStore, SetOutcome, StoreError, MAX_TRANSACTION_ATTEMPTS,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// In-memory storage entry for a slug mapping.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expire_at: Option<Timestamp>,
    /// Bumped on every write to the key; commits compare against it.
    version: u64,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expire_at
            .is_some_and(|expire_at| Timestamp::now() >= expire_at)
    }
}

/// What the read step of a transaction saw under the key.
enum Observed {
    Live(SetOutcome),
    Absent { version: Option<u64> },
}

/// In-memory implementation of [`MappingStore`] using DashMap.
///
/// `set_if_absent` mirrors a Redis `WATCH` transaction: the read step records
/// the key's version, and the write only commits if the version is unchanged.
/// A concurrent write in between aborts the attempt, which is then re-run
/// from the read step.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    storage: DashMap<String, Entry>,
    versions: AtomicU64,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    fn next_version(&self) -> u64 {
        self.versions.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn observe(&self, key: &str, value: &str) -> Observed {
        match self.storage.get(key) {
            Some(entry) if !entry.is_expired() => {
                if entry.value == value {
                    Observed::Live(SetOutcome::AlreadyStoredSame)
                } else {
                    Observed::Live(SetOutcome::Collision)
                }
            }
            Some(entry) => Observed::Absent {
                version: Some(entry.version),
            },
            None => Observed::Absent { version: None },
        }
    }

    /// Runs the conditional write, calling `interleave` between the read and
    /// the commit of every attempt.
    fn transact(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        interleave: impl Fn(),
    ) -> Result<SetOutcome> {
        let expire_at = effective_ttl(ttl)?.map(expire_at).transpose()?;

        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let observed_version = match self.observe(key, value) {
                Observed::Live(outcome) => {
                    trace!(key, ?outcome, "Key already holds a value");
                    return Ok(outcome);
                }
                Observed::Absent { version } => version,
            };

            interleave();

            let entry = Entry {
                value: value.to_owned(),
                expire_at,
                version: self.next_version(),
            };

            let committed = match self.storage.entry(key.to_owned()) {
                MapEntry::Occupied(mut occupied)
                    if Some(occupied.get().version) == observed_version =>
                {
                    occupied.insert(entry);
                    true
                }
                MapEntry::Vacant(vacant) if observed_version.is_none() => {
                    vacant.insert(entry);
                    true
                }
                _ => false,
            };

            if committed {
                debug!(key, attempt, "Stored mapping");
                return Ok(SetOutcome::Stored);
            }

            trace!(key, attempt, "Key changed during transaction, retrying");
        }

        warn!(key, "Optimistic transaction retries exhausted");
        Err(StoreError::RetryBudgetExhausted {
            key: key.to_owned(),
            attempts: MAX_TRANSACTION_ATTEMPTS,
        })
    }
}

fn expire_at(ttl: Duration) -> Result<Timestamp> {
    let ttl = SignedDuration::try_from(ttl)
        .map_err(|e| StoreError::Operation(format!("invalid ttl {ttl:?}: {e}")))?;
    Timestamp::now()
        .checked_add(ttl)
        .map_err(|e| StoreError::Operation(format!("invalid ttl {ttl:?}: {e}")))
}

#[async_trait]
impl MappingStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(entry) = self.storage.get(key) else {
            return Ok(None);
        };

        if entry.is_expired() {
            drop(entry);
            self.storage.remove_if(key, |_, entry| entry.is_expired());
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<SetOutcome> {
        self.transact(key, value, ttl, || {})
    }
}
