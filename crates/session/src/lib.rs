//! Focus Session
//!
//! Drives the signal processor and state machine once per tick and keeps
//! the session books:
//! - Time spent in each attentiveness state
//! - Ordered log of every state transition
//! - End-of-session summary and persistence records
//!
//! Also maps sensitivity profiles to matched threshold sets.

pub mod config;
pub mod profile;
pub mod record;
pub mod session;

pub use config::SessionConfig;
pub use profile::SensitivityProfile;
pub use record::{EventDetails, EventRecord, SessionRecord};
pub use session::{FocusSession, SessionStats, TickOutcome};

use thiserror::Error;

/// Session error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session not started")]
    NotStarted,

    #[error("Session has not been fully completed")]
    NotCompleted,

    #[error("Session already ended")]
    AlreadyEnded,

    #[error(transparent)]
    InvalidSignalConfig(#[from] signals::SignalError),

    #[error(transparent)]
    InvalidStateParams(#[from] focus_state::StateError),

    #[error("Invalid session configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Unknown sensitivity profile: {0}")]
    UnknownProfile(String),

    #[error("Tick timestamp {0} is outside the wall-clock range")]
    TimestampOutOfRange(f64),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}
