//! Logging setup.
//!
//! The terminal UI owns stdout, so interactive runs log to a file. One-shot
//! `--dump` runs log to stderr and keep stdout for the JSON document.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{0}': {1}")]
    Filter(String, String),

    #[error("Cannot open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Subscriber already installed: {0}")]
    Install(String),
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink<'a> {
    File(&'a Path),
    Stderr,
}

fn env_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(level).map_err(|e| TelemetryError::Filter(level.to_string(), e.to_string()))
}

/// Install the global subscriber.
pub fn init_logging(level: &str, sink: LogSink<'_>) -> Result<(), TelemetryError> {
    let filter = env_filter(level)?;

    match sink {
        LogSink::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TelemetryError::LogFile {
                    path: path.display().to_string(),
                    source,
                })?;

            fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .try_init()
                .map_err(|e| TelemetryError::Install(e.to_string()))
        }
        LogSink::Stderr => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| TelemetryError::Install(e.to_string())),
    }
}
