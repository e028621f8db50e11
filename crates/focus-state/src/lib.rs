//! Focus State Machine
//!
//! Converts continuous drowsiness/distraction scores into five discrete
//! attentiveness states with minimum-dwell and recovery-grace hysteresis:
//! - Focused
//! - Drowsy warning / alarm
//! - Distracted warning / alarm
//!
//! Every state change is reported as a [`FocusEvent`].

pub mod config;
pub mod machine;
pub mod state;

pub use config::StateParams;
pub use machine::{DwellTimers, FocusStateMachine};
pub use state::{FocusEvent, FocusEventKind, FocusState};

use thiserror::Error;

/// State machine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid state parameters: {field} = {value} ({reason})")]
    InvalidParams {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Unknown state identifier: {0}")]
    UnknownState(String),

    #[error("Unknown event identifier: {0}")]
    UnknownEvent(String),
}
