use crate::config::ShortenerConfig;
use crate::error::{Result, ShortenerError};
use crate::shortener::Shortener;
use crate::validate::{parse_http_url, slug_from_short_url};
use async_trait::async_trait;
use shortest_core::{Digest, MappingStore, SetOutcome, Slug, SlugWindows, StoreError};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// A concrete implementation of the [`Shortener`] trait.
///
/// Encoding hashes the URL, then offers the digest's windows to the store
/// one by one, from offset 0 upward, until `set_if_absent` reports that the
/// window now maps to this URL. Every caller walks the same windows in the
/// same order, so the same URL always settles on the same slug without any
/// coordination beyond the store's per-key transaction.
///
/// The service holds no state besides its configuration.
#[derive(Debug)]
pub struct ShortenerService<S> {
    store: Arc<S>,
    config: ShortenerConfig,
}

impl<S> Clone for ShortenerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: MappingStore> ShortenerService<S> {
    /// Creates a new `ShortenerService`, rejecting invalid configuration.
    pub fn new(store: S, config: ShortenerConfig) -> Result<Self> {
        Self::from_shared(Arc::new(store), config)
    }

    /// Creates a service over a store shared with other components.
    pub fn from_shared(store: Arc<S>, config: ShortenerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }
}

/// Runs a store call unless `cancel` fires first.
///
/// A write the store already committed stays committed; cancellation only
/// stops the caller from waiting for it.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = std::result::Result<T, StoreError>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ShortenerError::Cancelled),
        result = call => result.map_err(ShortenerError::from),
    }
}

#[async_trait]
impl<S: MappingStore> Shortener for ShortenerService<S> {
    async fn encode(&self, url: &str, cancel: &CancellationToken) -> Result<Slug> {
        parse_http_url(url)?;

        let digest = Digest::of(url);
        trace!(url, digest = %digest, "Digested url");

        let mut windows = SlugWindows::new(&digest, self.config.slug_length);
        loop {
            let attempt = windows.attempt();
            let candidate = windows.next_candidate()?;
            debug!(attempt, slug = %candidate, "Attempting to store slug");

            let outcome = cancellable(
                cancel,
                self.store.set_if_absent(candidate.as_str(), url, self.config.ttl),
            )
            .await?;

            match outcome {
                SetOutcome::Stored | SetOutcome::AlreadyStoredSame => {
                    info!(url, slug = %candidate, attempt, ?outcome, "Encoded url");
                    return Ok(candidate);
                }
                SetOutcome::Collision => {
                    debug!(attempt, slug = %candidate, "Slug taken by another url, shifting window");
                }
            }
        }
    }

    async fn decode(&self, slug: &Slug, cancel: &CancellationToken) -> Result<String> {
        match cancellable(cancel, self.store.get(slug.as_str())).await? {
            Some(url) => {
                info!(slug = %slug, url = %url, "Decoded slug");
                Ok(url)
            }
            None => {
                debug!(slug = %slug, "Slug not found");
                Err(ShortenerError::NotFound)
            }
        }
    }

    async fn encode_url(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        let slug = self.encode(url, cancel).await?;
        Ok(slug.to_url(&self.config.base_url.to_string()))
    }

    async fn decode_url(&self, short_url: &str, cancel: &CancellationToken) -> Result<String> {
        let raw_slug = slug_from_short_url(short_url)?;
        // A path that is not a well-formed slug was never stored.
        let slug = Slug::new(raw_slug).map_err(|_| ShortenerError::NotFound)?;
        self.decode(&slug, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PublicBaseUrl;
    use shortest_core::digest::DIGEST_LEN;
    use shortest_storage::InMemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const DARIO: &str = "https://github.com/darioblanco";

    fn config(slug_length: usize) -> ShortenerConfig {
        ShortenerConfig::builder()
            .slug_length(slug_length)
            .base_url(PublicBaseUrl::new("http", "localhost", 3000).unwrap())
            .build()
    }

    fn test_service() -> (Arc<InMemoryStore>, ShortenerService<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let service = ShortenerService::from_shared(Arc::clone(&store), config(6)).unwrap();
        (store, service)
    }

    /// Store whose every key is already taken by some other URL.
    #[derive(Default)]
    struct AlwaysCollides {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MappingStore for AlwaysCollides {
        async fn get(&self, _key: &str) -> shortest_core::error::Result<Option<String>> {
            Ok(Some("https://someone.else".to_string()))
        }

        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> shortest_core::error::Result<SetOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SetOutcome::Collision)
        }
    }

    /// Store that fails every call with the given error.
    struct Failing(StoreError);

    #[async_trait]
    impl MappingStore for Failing {
        async fn get(&self, _key: &str) -> shortest_core::error::Result<Option<String>> {
            Err(self.0.clone())
        }

        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> shortest_core::error::Result<SetOutcome> {
            Err(self.0.clone())
        }
    }

    /// Store whose calls never complete.
    struct Hanging;

    #[async_trait]
    impl MappingStore for Hanging {
        async fn get(&self, _key: &str) -> shortest_core::error::Result<Option<String>> {
            std::future::pending().await
        }

        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<Duration>,
        ) -> shortest_core::error::Result<SetOutcome> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn encodes_known_url_to_first_window() {
        let (_, service) = test_service();
        let cancel = CancellationToken::new();

        let slug = service.encode(DARIO, &cancel).await.unwrap();
        assert_eq!(slug.as_str(), "64fc5e");

        let again = service.encode(DARIO, &cancel).await.unwrap();
        assert_eq!(again.as_str(), "64fc5e");

        let url = service.decode(&slug, &cancel).await.unwrap();
        assert_eq!(url, DARIO);
    }

    #[tokio::test]
    async fn round_trip_many_urls() {
        let (_, service) = test_service();
        let cancel = CancellationToken::new();

        for i in 0..200 {
            let url = format!("https://example.com/page/{i}");
            let slug = service.encode(&url, &cancel).await.unwrap();
            assert_eq!(slug.as_str().len(), 6);
            assert_eq!(service.decode(&slug, &cancel).await.unwrap(), url);
            assert_eq!(service.encode(&url, &cancel).await.unwrap(), slug);
        }
    }

    #[tokio::test]
    async fn collision_shifts_window_without_corrupting_first_mapping() {
        let (store, service) = test_service();
        let cancel = CancellationToken::new();

        store
            .set_if_absent("64fc5e", "https://first.example", None)
            .await
            .unwrap();

        let slug = service.encode(DARIO, &cancel).await.unwrap();
        assert_eq!(slug.as_str(), "4fc5e4");

        let first = service
            .decode(&Slug::new("64fc5e").unwrap(), &cancel)
            .await
            .unwrap();
        assert_eq!(first, "https://first.example");
        assert_eq!(service.decode(&slug, &cancel).await.unwrap(), DARIO);

        // Idempotent across the shifted window as well.
        assert_eq!(service.encode(DARIO, &cancel).await.unwrap(), slug);
    }

    #[tokio::test]
    async fn window_exhaustion_after_every_candidate() {
        let store = Arc::new(AlwaysCollides::default());
        let service = ShortenerService::from_shared(Arc::clone(&store), config(6)).unwrap();

        let err = service
            .encode(DARIO, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::WindowExhausted(exhausted) if exhausted.attempt == DIGEST_LEN - 6 + 1
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), DIGEST_LEN - 6 + 1);
    }

    #[tokio::test]
    async fn full_length_slug_has_single_candidate() {
        let store = Arc::new(AlwaysCollides::default());
        let service =
            ShortenerService::from_shared(Arc::clone(&store), config(DIGEST_LEN)).unwrap();

        let err = service
            .encode(DARIO, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::WindowExhausted(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn decode_unmapped_slug_is_not_found() {
        let (_, service) = test_service();

        let err = service
            .decode(&Slug::new("000000").unwrap(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::NotFound));
    }

    #[tokio::test]
    async fn encode_rejects_invalid_urls() {
        let (store, service) = test_service();
        let cancel = CancellationToken::new();

        for url in [
            "not-a-valid-url",
            "ftp://example.com",
            "http://",
            "",
            "  https://example.com  ",
            "http:example.com",
            "http:/example.com",
            "https:\\example.com",
        ] {
            let err = service.encode(url, &cancel).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)), "{url}");
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let service = ShortenerService::new(
            Failing(StoreError::Unavailable("connection refused".to_string())),
            config(6),
        )
        .unwrap();
        let cancel = CancellationToken::new();

        let err = service.encode(DARIO, &cancel).await.unwrap_err();
        assert!(matches!(err, ShortenerError::Store(StoreError::Unavailable(_))));

        let err = service
            .decode(&Slug::new("64fc5e").unwrap(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn retry_budget_exhaustion_is_not_a_collision() {
        let service = ShortenerService::new(
            Failing(StoreError::RetryBudgetExhausted {
                key: "64fc5e".to_string(),
                attempts: 5,
            }),
            config(6),
        )
        .unwrap();

        let err = service
            .encode(DARIO, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::Store(StoreError::RetryBudgetExhausted { .. })
        ));
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_writing() {
        let (store, service) = test_service();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = service.encode(DARIO, &cancel).await.unwrap_err();
        assert!(matches!(err, ShortenerError::Cancelled));
        assert!(store.is_empty());

        let err = service
            .decode(&Slug::new("64fc5e").unwrap(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::Cancelled));
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_store_call() {
        let service = ShortenerService::new(Hanging, config(6)).unwrap();
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                cancel.cancel();
            })
        };

        let err = service.encode(DARIO, &cancel).await.unwrap_err();
        assert!(matches!(err, ShortenerError::Cancelled));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn encode_url_and_decode_url() {
        let (_, service) = test_service();
        let cancel = CancellationToken::new();

        let short_url = service.encode_url(DARIO, &cancel).await.unwrap();
        assert_eq!(short_url, "http://localhost:3000/64fc5e");

        let long_url = service.decode_url(&short_url, &cancel).await.unwrap();
        assert_eq!(long_url, DARIO);
    }

    #[tokio::test]
    async fn decode_url_with_malformed_slug_is_not_found() {
        let (_, service) = test_service();
        let cancel = CancellationToken::new();

        for short_url in ["http://localhost:3000/", "http://localhost:3000/NOT-HEX"] {
            let err = service.decode_url(short_url, &cancel).await.unwrap_err();
            assert!(matches!(err, ShortenerError::NotFound), "{short_url}");
        }

        let err = service.decode_url("64fc5e", &cancel).await.unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn ttl_is_applied_to_mappings() {
        let store = Arc::new(InMemoryStore::new());
        let config = ShortenerConfig::builder()
            .ttl(Some(Duration::from_millis(20)))
            .base_url(PublicBaseUrl::new("http", "localhost", 3000).unwrap())
            .build();
        let service = ShortenerService::from_shared(Arc::clone(&store), config).unwrap();
        let cancel = CancellationToken::new();

        let slug = service.encode(DARIO, &cancel).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = service.decode(&slug, &cancel).await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let err = ShortenerService::new(InMemoryStore::new(), config(0)).unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidConfig(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_encodes_of_same_url_agree() {
        let (_, service) = test_service();
        let mut handles = vec![];

        for _ in 0..32 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.encode(DARIO, &CancellationToken::new()).await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().as_str(), "64fc5e");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_encodes_with_tiny_slugs_never_share_a_slug() {
        // Two-character slugs make collisions between distinct URLs likely.
        let store = Arc::new(InMemoryStore::new());
        let service = ShortenerService::from_shared(Arc::clone(&store), config(2)).unwrap();
        let mut handles = vec![];

        for i in 0..12 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let url = format!("https://example.com/{i}");
                let slug = service.encode(&url, &CancellationToken::new()).await;
                (url, slug)
            }));
        }

        let mut seen = std::collections::HashMap::new();
        for handle in handles {
            let (url, slug) = handle.await.unwrap();
            let slug = slug.unwrap();
            assert!(seen.insert(slug.clone(), url.clone()).is_none());
            assert_eq!(
                service.decode(&slug, &CancellationToken::new()).await.unwrap(),
                url
            );
        }
    }
}
