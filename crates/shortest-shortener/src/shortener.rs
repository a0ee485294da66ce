use crate::error::Result;
use async_trait::async_trait;
use shortest_core::Slug;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Derives the slug for `url` and records the mapping.
    ///
    /// Encoding the same URL again returns the same slug.
    async fn encode(&self, url: &str, cancel: &CancellationToken) -> Result<Slug>;

    /// Resolves a slug to the URL it was encoded from.
    async fn decode(&self, slug: &Slug, cancel: &CancellationToken) -> Result<String>;

    /// Like [`encode`](Shortener::encode), returning the fully qualified short URL.
    async fn encode_url(&self, url: &str, cancel: &CancellationToken) -> Result<String>;

    /// Like [`decode`](Shortener::decode), taking a fully qualified short URL.
    async fn decode_url(&self, short_url: &str, cancel: &CancellationToken) -> Result<String>;
}
