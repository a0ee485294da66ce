use clap::{Parser, ValueEnum};
use shortest_telemetry::Environment;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "SHORTEST_LISTEN_ADDR";
pub const ENVIRONMENT_ENV: &str = "SHORTEST_ENVIRONMENT";
pub const PUBLIC_SCHEME_ENV: &str = "SHORTEST_PUBLIC_SCHEME";
pub const PUBLIC_HOST_ENV: &str = "SHORTEST_PUBLIC_HOST";
pub const PUBLIC_PORT_ENV: &str = "SHORTEST_PUBLIC_PORT";
pub const SLUG_LENGTH_ENV: &str = "SHORTEST_SLUG_LENGTH";
pub const URL_TTL_HOURS_ENV: &str = "SHORTEST_URL_TTL_HOURS";
pub const STORAGE_BACKEND_ENV: &str = "SHORTEST_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "SHORTEST_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "SHORTEST_REDIS_KEY_PREFIX";
pub const REQUEST_TIMEOUT_MS_ENV: &str = "SHORTEST_REQUEST_TIMEOUT_MS";
pub const SHUTDOWN_GRACE_SECS_ENV: &str = "SHORTEST_SHUTDOWN_GRACE_SECS";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_PUBLIC_SCHEME: &str = "http";
pub const DEFAULT_PUBLIC_HOST: &str = "localhost";
pub const DEFAULT_PUBLIC_PORT: u16 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvironmentArg {
    Dev,
    Test,
    Stage,
    Prod,
}

impl From<EnvironmentArg> for Environment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Dev => Environment::Dev,
            EnvironmentArg::Test => Environment::Test,
            EnvironmentArg::Stage => Environment::Stage,
            EnvironmentArg::Prod => Environment::Prod,
        }
    }
}

impl Display for EnvironmentArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Environment::from(*self).fmt(f)
    }
}

#[derive(Debug, Parser)]
#[command(name = "shortest-gateway", version)]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = ENVIRONMENT_ENV,
        value_enum,
        default_value_t = EnvironmentArg::Dev
    )]
    pub environment: EnvironmentArg,

    #[arg(long, env = PUBLIC_SCHEME_ENV, default_value = DEFAULT_PUBLIC_SCHEME)]
    pub public_scheme: String,

    #[arg(long, env = PUBLIC_HOST_ENV, default_value = DEFAULT_PUBLIC_HOST)]
    pub public_host: String,

    #[arg(long, env = PUBLIC_PORT_ENV, default_value_t = DEFAULT_PUBLIC_PORT)]
    pub public_port: u16,

    #[arg(
        long,
        env = SLUG_LENGTH_ENV,
        default_value_t = shortest_shortener::config::DEFAULT_SLUG_LENGTH
    )]
    pub slug_length: usize,

    /// Hours before a mapping expires; 0 keeps mappings forever.
    #[arg(long, env = URL_TTL_HOURS_ENV, default_value_t = 0)]
    pub url_ttl_hours: u64,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(
        long,
        env = REDIS_KEY_PREFIX_ENV,
        default_value = shortest_storage::redis::DEFAULT_KEY_PREFIX
    )]
    pub redis_key_prefix: String,

    #[arg(long, env = REQUEST_TIMEOUT_MS_ENV, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    #[arg(long, env = SHUTDOWN_GRACE_SECS_ENV, default_value_t = DEFAULT_SHUTDOWN_GRACE_SECS)]
    pub shutdown_grace_secs: u64,
}

impl CLI {
    pub fn url_ttl(&self) -> Option<Duration> {
        match self.url_ttl_hours {
            0 => None,
            hours => Some(Duration::from_secs(hours.saturating_mul(3600))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
