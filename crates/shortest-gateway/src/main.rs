use anyhow::Context;
use clap::Parser;
use shortest_gateway::app::App;
use shortest_gateway::cli::{StorageBackendArg, CLI};
use shortest_gateway::shutdown::Shutdown;
use shortest_gateway::state::AppState;
use shortest_shortener::{PublicBaseUrl, Shortener, ShortenerConfig, ShortenerService};
use shortest_storage::{InMemoryStore, RedisStore};
use shortest_telemetry::Environment;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Instrument, Span};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let environment = Environment::from(config.environment);
    shortest_telemetry::init(environment)?;

    let root_span = shortest_telemetry::root_span(environment, env!("CARGO_PKG_VERSION"));
    run(config, root_span.clone()).instrument(root_span).await
}

async fn run(config: CLI, root_span: Span) -> anyhow::Result<()> {
    let base_url = PublicBaseUrl::new(
        config.public_scheme.as_str(),
        config.public_host.as_str(),
        config.public_port,
    )?;
    let shortener_config = ShortenerConfig::builder()
        .slug_length(config.slug_length)
        .ttl(config.url_ttl())
        .base_url(base_url)
        .build();

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        public_base_url = %shortener_config.base_url,
        slug_length = shortener_config.slug_length,
        ttl = ?shortener_config.ttl,
        "starting gateway server"
    );

    let shortener: Arc<dyn Shortener> = match config.storage {
        StorageBackendArg::InMemory => {
            Arc::new(ShortenerService::new(InMemoryStore::new(), shortener_config)?)
        }
        StorageBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            let store = RedisStore::connect(redis_url, config.redis_key_prefix.as_str())
                .await
                .context("redis is unavailable")?;
            Arc::new(ShortenerService::new(store, shortener_config)?)
        }
    };

    let shutdown = Shutdown::new();
    let state = AppState::new(
        shortener,
        config.request_timeout(),
        shutdown.hard_stop().clone(),
    );
    let app = App::router(state, root_span);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    tokio::spawn(shutdown.clone().listen_for_signals().in_current_span());
    tokio::spawn(
        shutdown
            .clone()
            .escalate_after(config.shutdown_grace())
            .in_current_span(),
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.graceful().clone().cancelled_owned())
        .await
        .context("gateway server failed")?;

    info!("gateway stopped");
    Ok(())
}
