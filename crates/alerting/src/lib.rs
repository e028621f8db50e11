//! Alarm Gating
//!
//! Decides when a state transition warrants a user-facing alarm and
//! rate-limits alarms per kind with a cooldown.

mod gate;

pub use gate::{AlarmConfig, AlarmGate, AlarmKind, AlarmState};

use thiserror::Error;

/// Alarm configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlarmError {
    #[error("Invalid alarm configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}
