//! Process-wide logging set-up shared by the Burrow binaries.

use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install log bridge: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Builds the env filter: `RUST_LOG` if set, `fallback` otherwise.
pub fn env_filter(fallback: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(fallback)?),
    }
}

/// Builds the subscriber without installing it.
pub fn subscriber(
    format: LogFormat,
    filter: EnvFilter,
) -> Box<dyn Subscriber + Send + Sync + 'static> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Text => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
    }
}

/// Installs the global subscriber and forwards `log` records from
/// dependencies (sqlx among them) into it. Call once at start-up.
pub fn init(format: LogFormat) -> Result<(), TelemetryError> {
    let filter = env_filter(DEFAULT_FILTER)?;
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber(format, filter))?;
    Ok(())
}
