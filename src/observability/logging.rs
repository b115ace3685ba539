//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Pick the output format (JSON or human) and destination (stdout or file)
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - File output is append-only and never colored

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::ObservabilityConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber. `log_path` redirects output to a file.
pub fn init(config: &ObservabilityConfig, log_path: Option<&Path>) -> Result<(), LoggingError> {
    let file = match log_path {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| env_filter(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt_layer(config.json_logs, file))
        .with(filter)
        .try_init()?;
    Ok(())
}

/// Filter for `level` applied to this crate and tower_http.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("scoring_api={level},tower_http={level}"))
}

fn fmt_layer(json: bool, file: Option<File>) -> BoxedLayer {
    match (json, file) {
        (true, Some(file)) => fmt::layer().json().with_writer(Mutex::new(file)).boxed(),
        (true, None) => fmt::layer().json().boxed(),
        (false, Some(file)) => fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .boxed(),
        (false, None) => fmt::layer().boxed(),
    }
}
