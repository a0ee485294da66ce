use crate::error::{AppError, Result};
use shortest_shortener::Shortener;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    request_timeout: Duration,
    hard_stop: CancellationToken,
}

impl AppState {
    /// `hard_stop` aborts every in-flight request once cancelled.
    pub fn new(
        shortener: Arc<dyn Shortener>,
        request_timeout: Duration,
        hard_stop: CancellationToken,
    ) -> Self {
        Self {
            shortener,
            request_timeout,
            hard_stop,
        }
    }

    pub fn shortener(&self) -> Arc<dyn Shortener> {
        Arc::clone(&self.shortener)
    }

    /// Runs `op` with a per-request child token, bounded by the request timeout.
    pub async fn within_deadline<T, F>(&self, op: impl FnOnce(CancellationToken) -> F) -> Result<T>
    where
        F: Future<Output = shortest_shortener::error::Result<T>>,
    {
        let cancel = self.hard_stop.child_token();

        match tokio::time::timeout(self.request_timeout, op(cancel)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::DeadlineExceeded(self.request_timeout)),
        }
    }
}
