use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Two-phase shutdown.
///
/// The graceful token stops the listener from accepting new connections.
/// The hard-stop token is cancelled once the grace period has elapsed
/// after that, aborting whatever requests are still in flight.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    graceful: CancellationToken,
    hard_stop: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graceful(&self) -> &CancellationToken {
        &self.graceful
    }

    pub fn hard_stop(&self) -> &CancellationToken {
        &self.hard_stop
    }

    /// Starts draining.
    pub fn trigger(&self) {
        self.graceful.cancel();
    }

    /// Cancels the hard-stop token `grace` after draining starts.
    pub async fn escalate_after(self, grace: Duration) {
        self.graceful.cancelled().await;
        tokio::time::sleep(grace).await;
        if !self.hard_stop.is_cancelled() {
            warn!(?grace, "grace period elapsed, cancelling in-flight requests");
            self.hard_stop.cancel();
        }
    }

    /// Triggers draining on SIGINT or SIGTERM.
    pub async fn listen_for_signals(self) {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(err) => {
                    error!(error = %err, "failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        info!("shutdown signal received, draining connections");
        self.trigger();
    }
}
