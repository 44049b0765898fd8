//! Tracing setup: console output plus daily rolling log files

use std::path::Path;

use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{ApiError, Result};

const DEFAULT_FILTER: &str = "navilead_server=debug,navilead=info,tower_http=debug";

/// Keeps the file writers flushing; drop it only on shutdown
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Console and `<log_dir>/navilead-server.log` follow `RUST_LOG`;
/// `<log_dir>/error/navilead-server-error.log` only receives errors.
pub fn init(log_dir: &Path) -> Result<LogGuards> {
    let error_dir = log_dir.join("error");
    std::fs::create_dir_all(&error_dir)?;

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (general_writer, general_guard) =
        non_blocking(rolling::daily(log_dir, "navilead-server.log"));
    let (error_writer, error_guard) =
        non_blocking(rolling::daily(&error_dir, "navilead-server-error.log"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_filter(filter()),
        )
        .with(
            fmt::layer()
                .with_writer(general_writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter()),
        )
        .with(
            fmt::layer()
                .with_writer(error_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(EnvFilter::new("error")),
        )
        .try_init()
        .map_err(|e| ApiError::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(LogGuards {
        _guards: vec![general_guard, error_guard],
    })
}
