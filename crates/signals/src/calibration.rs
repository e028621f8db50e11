//! Eye-openness threshold calibration
//!
//! The user holds their eyes open for one phase and closed for another;
//! the threshold is placed between the two phase means.

use crate::processor::Measurement;
use crate::SignalError;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default length of each calibration phase (seconds)
pub const DEFAULT_PHASE_SECONDS: f64 = 3.0;

/// Which eye posture is being sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationPhase {
    Open,
    Closed,
}

/// Calibrated eye-openness levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Mean ratio with eyes open
    pub ear_open: f64,
    /// Mean ratio with eyes closed
    pub ear_closed: f64,
    /// Threshold to use for blink detection
    pub ear_threshold: f64,
}

impl CalibrationResult {
    /// Derive the threshold from raw phase samples
    pub fn from_samples(open: &[f64], closed: &[f64]) -> Result<Self, SignalError> {
        if open.is_empty() || closed.is_empty() {
            return Err(SignalError::InsufficientCalibrationSamples {
                open: open.len(),
                closed: closed.len(),
            });
        }

        let ear_open = mean(open);
        let ear_closed = mean(closed);

        // Closed eyes that read wider than open ones: fall back to 80% of open
        let ear_threshold = if ear_open <= ear_closed {
            ear_open * 0.8
        } else {
            (ear_open + ear_closed) / 2.0
        };

        Ok(Self {
            ear_open,
            ear_closed,
            ear_threshold,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Progress through the active phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseProgress {
    /// Elapsed fraction of the phase (0-1)
    pub fraction: f64,
    /// Whether the phase duration has elapsed
    pub complete: bool,
}

/// Collects eye-ratio samples for both calibration phases
#[derive(Debug, Clone)]
pub struct CalibrationCollector {
    phase_seconds: f64,
    active: Option<(CalibrationPhase, f64)>,
    open_samples: Vec<f64>,
    closed_samples: Vec<f64>,
}

impl CalibrationCollector {
    /// Create a collector whose phases each last `phase_seconds`
    pub fn new(phase_seconds: f64) -> Self {
        Self {
            phase_seconds,
            active: None,
            open_samples: Vec::new(),
            closed_samples: Vec::new(),
        }
    }

    /// Start sampling a phase, discarding earlier samples for it
    pub fn begin(&mut self, phase: CalibrationPhase, timestamp: f64) {
        info!("Calibration phase {:?} started", phase);
        self.samples_mut(phase).clear();
        self.active = Some((phase, timestamp));
    }

    /// Record one tick into the active phase.
    ///
    /// Ticks without a face or with an unknown eye ratio advance the phase
    /// clock but contribute no sample.
    pub fn record(
        &mut self,
        timestamp: f64,
        measurement: &Measurement,
    ) -> Result<PhaseProgress, SignalError> {
        let (phase, started) = self.active.ok_or(SignalError::NoActivePhase)?;

        if let Some(ratio) = measurement.min_eye_ratio() {
            self.samples_mut(phase).push(ratio);
        }

        let elapsed = (timestamp - started).max(0.0);
        let fraction = if self.phase_seconds > 0.0 {
            (elapsed / self.phase_seconds).min(1.0)
        } else {
            1.0
        };
        let complete = elapsed >= self.phase_seconds;
        if complete {
            info!("Calibration phase {:?} complete", phase);
            self.active = None;
        }

        Ok(PhaseProgress { fraction, complete })
    }

    /// Phase currently being sampled
    pub fn active_phase(&self) -> Option<CalibrationPhase> {
        self.active.map(|(phase, _)| phase)
    }

    /// Samples collected for a phase
    pub fn samples(&self, phase: CalibrationPhase) -> &[f64] {
        match phase {
            CalibrationPhase::Open => &self.open_samples,
            CalibrationPhase::Closed => &self.closed_samples,
        }
    }

    fn samples_mut(&mut self, phase: CalibrationPhase) -> &mut Vec<f64> {
        match phase {
            CalibrationPhase::Open => &mut self.open_samples,
            CalibrationPhase::Closed => &mut self.closed_samples,
        }
    }

    /// Compute the calibration from everything collected
    pub fn finish(&self) -> Result<CalibrationResult, SignalError> {
        let result = CalibrationResult::from_samples(&self.open_samples, &self.closed_samples)?;
        info!(
            "Calibration complete: open {:.3}, closed {:.3}, threshold {:.3}",
            result.ear_open, result.ear_closed, result.ear_threshold
        );
        Ok(result)
    }
}

impl Default for CalibrationCollector {
    fn default() -> Self {
        Self::new(DEFAULT_PHASE_SECONDS)
    }
}
