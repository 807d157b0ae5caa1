//! Logger module
//!
//! Provides logging utilities for the streaming server including:
//! - Subscriber setup (stderr or a log file)
//! - Server lifecycle logging
//! - Access logging with multiple formats on the `access` target
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Target used for access log lines, so they can be filtered separately
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level`. Should be called once at
/// application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| EnvFilter::try_new(&config.level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.log_file.as_deref() {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| std::io::Error::new(std::io::ErrorKind::AlreadyExists, e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Streaming server started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
    tracing::info!(
        buffer_size = config.stream.buffer_size,
        degrade_unseekable = config.stream.degrade_unseekable,
        "Range streaming ready"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::warn!("Failed to serve connection: {err:?}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}
