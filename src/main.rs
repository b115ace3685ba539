//! Scoring API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client POST /method
//!     ─────────────────────▶ http (request id, limits, timeout, trace)
//!                              │
//!                              ▼
//!                            dispatch ── envelope shape ── security::auth
//!                              │
//!                              ▼
//!                            handlers ── method shape (fields, requests)
//!                              │
//!                              ▼
//!                            scoring ──▶ store (retry, reconnect, TTL cache)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use scoring_api::config::{load_config, ScoringConfig};
use scoring_api::dispatch::Dispatcher;
use scoring_api::http::HttpServer;
use scoring_api::lifecycle::{signals, Shutdown};
use scoring_api::observability::{logging, metrics};
use scoring_api::resilience::RetryPolicy;
use scoring_api::security::Authenticator;
use scoring_api::store::{MemoryBackend, Store};

/// Client ids seeded with sample interests in the in-process store.
const SAMPLE_CLIENTS: i64 = 1000;

#[derive(Debug, Parser)]
#[command(name = "scoring-api", version, about = "Scoring request API server")]
struct Cli {
    /// Port to listen on; overrides the configured bind address port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Write logs to this file instead of stdout.
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ScoringConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.bind_address = with_port(&config.listener.bind_address, port)?;
    }

    logging::init(&config.observability, cli.log.as_deref())?;
    tracing::info!("scoring-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        reconnect_attempts = config.store.reconnect_attempts,
        reconnect_delay_ms = config.store.reconnect_delay_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let backend = Arc::new(MemoryBackend::with_sample_interests(SAMPLE_CLIENTS));
    let store = Arc::new(Store::new(backend, RetryPolicy::from(&config.store)));
    if !store.connect().await {
        tracing::warn!("Store unavailable at startup, connecting on first use");
    }
    let dispatcher = Dispatcher::new(store, Authenticator::new(&config.auth));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(async move {
        signals::trigger_on_ctrl_c(&shutdown).await;
    });

    HttpServer::new(config, dispatcher).run(listener, stop).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn with_port(address: &str, port: u16) -> Result<String, std::net::AddrParseError> {
    let mut addr: SocketAddr = address.parse()?;
    addr.set_port(port);
    Ok(addr.to_string())
}
