//! Process-wide tracing setup shared by the shortest binaries.

use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::Span;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Deployment environment, which selects the log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
    Stage,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Stage => "stage",
            Environment::Prod => "prod",
        }
    }

    /// Whether logs are emitted as JSON lines rather than human-readable text.
    pub fn structured_logs(&self) -> bool {
        !matches!(self, Environment::Dev)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install log bridge: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs the global subscriber and routes `log` records into it.
///
/// Must be called once, before any other tracing happens.
pub fn init(environment: Environment) -> Result<(), TelemetryError> {
    let registry = Registry::default().with(env_filter());

    if environment.structured_logs() {
        install(registry.with(fmt::layer().json()))
    } else {
        install(registry.with(fmt::layer().pretty()))
    }
}

/// Span that every request span hangs off, tagging log lines with the
/// environment and the running version.
pub fn root_span(environment: Environment, version: &str) -> Span {
    tracing::info_span!("shortest", environment = %environment, version)
}

fn install<S>(subscriber: S) -> Result<(), TelemetryError>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
