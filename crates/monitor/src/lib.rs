//! Focus Monitor
//!
//! Settings loading, logging setup and the measurement replay driver
//! behind the `focus-monitor` binary.

pub mod replay;
pub mod settings;

pub use replay::{spawn_reader, FiredAlarm, ReaderSummary, ReplayOutput, ReplayReport, TickInput};
pub use settings::{LogFormat, MonitorSettings};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "monitor=info,focus_monitor=info,session=info,focus_state=info,alerting=info,signals=warn";

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Alarm error: {0}")]
    Alarm(#[from] alerting::AlarmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No measurements received")]
    EmptyInput,

    #[error("Reader task failed: {0}")]
    Reader(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_logging(format: LogFormat) -> Result<(), MonitorError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| MonitorError::Logging(e.to_string()))
}
