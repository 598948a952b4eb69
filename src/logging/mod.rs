//! Logging module for authsock-mux
//!
//! This module provides logging functionality using tracing and tracing-subscriber.
//! It supports:
//! - Configurable log levels via verbose/quiet flags, overridable with RUST_LOG
//! - Human-readable logs on stderr
//! - A separate JSONL event log for agent requests (see [`jsonl`])

pub mod jsonl;

pub use jsonl::{Decision, JsonlWriter, LogEvent, LogEventKind};

use crate::error::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Logging configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    /// Verbosity level adjustment: -1 for quiet, 0 for normal, +1 for verbose
    pub verbosity: i8,
}

impl LogConfig {
    /// Create a new log configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the global command line flags
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (_, true) => Self::new().quiet(),
            (true, false) => Self::new().verbose(),
            _ => Self::new(),
        }
    }

    /// Set verbose mode (+1 verbosity)
    pub fn verbose(mut self) -> Self {
        self.verbosity = 1;
        self
    }

    /// Set quiet mode (-1 verbosity)
    pub fn quiet(mut self) -> Self {
        self.verbosity = -1;
        self
    }

    /// Get the minimum log level based on verbosity
    fn min_level(&self) -> Level {
        match self.verbosity {
            v if v < 0 => Level::WARN,
            0 => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}

/// Install the global tracing subscriber writing to stderr
///
/// `RUST_LOG` takes precedence over the configured verbosity.
pub fn init(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.min_level().into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set global tracing subscriber: {}", e)))
}

/// Open the JSONL event log shared by every served socket
pub fn open_event_log(path: &Path) -> Result<Arc<JsonlWriter>> {
    let writer = JsonlWriter::new(path).map_err(|e| {
        Error::Config(format!(
            "Failed to open JSONL log file '{}': {}",
            path.display(),
            e
        ))
    })?;
    tracing::info!(log = %path.display(), "JSONL event logging enabled");
    Ok(Arc::new(writer))
}
