//! Attentiveness Signal Processing
//!
//! Turns per-frame face measurements into windowed scores:
//! - Blink and long-blink detection from eye-openness ratios
//! - Blink rate over a trailing time window
//! - Fraction of ticks with no face detected
//! - Drowsiness and distraction scores on a 0-100 scale

pub mod calibration;
pub mod config;
pub mod processor;
pub mod window;

pub use calibration::{CalibrationCollector, CalibrationPhase, CalibrationResult, PhaseProgress};
pub use config::SignalConfig;
pub use processor::{Measurement, SignalProcessor, SignalScores};
pub use window::{TimedEntry, TimedWindow};

use thiserror::Error;

/// Signal processing error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("Invalid signal configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Calibration needs samples in both phases (open: {open}, closed: {closed})")]
    InsufficientCalibrationSamples { open: usize, closed: usize },

    #[error("No calibration phase in progress")]
    NoActivePhase,
}
