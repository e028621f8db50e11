//! Windowed blink and face-presence scoring

use crate::config::SignalConfig;
use crate::window::TimedWindow;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-tick output of the landmark extractor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    /// Whether a face was found in the frame
    pub face_present: bool,

    /// Left eye openness ratio (smaller = more closed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye_ratio: Option<f64>,

    /// Right eye openness ratio (smaller = more closed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye_ratio: Option<f64>,
}

impl Measurement {
    /// Measurement for a frame with a detected face
    pub fn face(left_eye_ratio: f64, right_eye_ratio: f64) -> Self {
        Self {
            face_present: true,
            left_eye_ratio: Some(left_eye_ratio),
            right_eye_ratio: Some(right_eye_ratio),
        }
    }

    /// Measurement for a frame without a face
    pub fn no_face() -> Self {
        Self::default()
    }

    /// The more-closed of the two eyes, when both are known and finite
    pub fn min_eye_ratio(&self) -> Option<f64> {
        if !self.face_present {
            return None;
        }
        match (self.left_eye_ratio, self.right_eye_ratio) {
            (Some(left), Some(right)) if left.is_finite() && right.is_finite() => {
                Some(left.min(right))
            }
            _ => None,
        }
    }
}

/// Snapshot of the windowed scores, recomputed on every update
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalScores {
    /// Drowsiness score (0-100)
    pub drowsiness_score: f64,
    /// Distraction score (0-100)
    pub distraction_score: f64,
    /// Blinks per minute over the window span
    pub blink_rate_per_minute: f64,
    /// Long blinks currently in the window
    pub long_blink_count: usize,
    /// Fraction of window ticks without a face (0-1)
    pub fraction_face_missing: f64,
}

/// Eye-closure tracking between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
enum EyeClosure {
    Open,
    Closed { since: f64 },
}

/// Sliding-window signal processor
pub struct SignalProcessor {
    config: SignalConfig,
    /// Face-present flag per tick
    samples: TimedWindow<bool>,
    /// Ticks in `samples` with a face
    present_samples: usize,
    /// End timestamps of completed blinks
    blinks: TimedWindow<()>,
    /// End timestamps of completed long blinks
    long_blinks: TimedWindow<()>,
    closure: EyeClosure,
    last_timestamp: Option<f64>,
}

impl SignalProcessor {
    /// Create a processor with the given configuration
    pub fn new(config: SignalConfig) -> Self {
        debug!("Creating signal processor with config: {:?}", config);
        Self {
            config,
            samples: TimedWindow::new(),
            present_samples: 0,
            blinks: TimedWindow::new(),
            long_blinks: TimedWindow::new(),
            closure: EyeClosure::Open,
            last_timestamp: None,
        }
    }

    /// Feed one tick of raw measurements and return the updated scores
    pub fn update(
        &mut self,
        timestamp: f64,
        face_present: bool,
        left_eye_ratio: Option<f64>,
        right_eye_ratio: Option<f64>,
    ) -> SignalScores {
        self.update_measurement(
            timestamp,
            &Measurement {
                face_present,
                left_eye_ratio,
                right_eye_ratio,
            },
        )
    }

    /// Feed one tick from a [`Measurement`]
    pub fn update_measurement(&mut self, timestamp: f64, measurement: &Measurement) -> SignalScores {
        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                warn!(
                    "Non-monotonic timestamp: {:.3} after {:.3}, window span will be clamped",
                    timestamp, last
                );
            }
        }
        self.last_timestamp = Some(timestamp);

        self.evict_expired(timestamp);

        self.samples.push(timestamp, measurement.face_present);
        if measurement.face_present {
            self.present_samples += 1;
        }

        self.track_blink(timestamp, measurement.min_eye_ratio());
        self.scores()
    }

    fn evict_expired(&mut self, timestamp: f64) {
        let cutoff = timestamp - self.config.window_duration_seconds;

        while let Some(expired) = self.samples.pop_expired(cutoff) {
            if expired.value {
                self.present_samples -= 1;
            }
        }
        self.blinks.evict_before(cutoff);
        self.long_blinks.evict_before(cutoff);
    }

    // An unknown ratio neither starts nor ends a closure.
    fn track_blink(&mut self, timestamp: f64, min_eye_ratio: Option<f64>) {
        let Some(ratio) = min_eye_ratio else {
            return;
        };
        let eyes_closed = ratio < self.config.eye_aspect_ratio_threshold;

        match self.closure {
            EyeClosure::Open if eyes_closed => {
                self.closure = EyeClosure::Closed { since: timestamp };
            }
            EyeClosure::Closed { since } if !eyes_closed => {
                let duration = timestamp - since;
                if duration >= self.config.minimum_blink_duration_seconds {
                    self.blinks.push(timestamp, ());
                    if duration >= self.config.minimum_long_blink_duration_seconds {
                        self.long_blinks.push(timestamp, ());
                        debug!("Long blink of {:.3}s at {:.3}", duration, timestamp);
                    }
                }
                self.closure = EyeClosure::Open;
            }
            _ => {}
        }
    }

    /// Scores for the current window contents
    pub fn scores(&self) -> SignalScores {
        let total = self.samples.len();
        if total == 0 {
            return SignalScores::default();
        }

        let window = self.config.window_duration_seconds;
        let span = match self.samples.span() {
            Some(span) if span > 0.0 => span.min(window),
            _ => window,
        };

        let blink_count = self.blinks.len();
        let long_blink_count = self.long_blinks.len();

        let blink_rate_per_minute = if blink_count > 0 {
            blink_count as f64 * 60.0 / span
        } else {
            0.0
        };

        let fraction_face_missing = 1.0 - self.present_samples as f64 / total as f64;

        let excess_blink_rate =
            (blink_rate_per_minute - self.config.baseline_blink_rate_per_minute).max(0.0);
        let drowsiness = self.config.drowsiness_long_blink_weight * long_blink_count as f64
            + self.config.drowsiness_blink_rate_weight * excess_blink_rate;
        let distraction = self.config.distraction_face_missing_weight * fraction_face_missing;

        SignalScores {
            drowsiness_score: clamp_score(drowsiness),
            distraction_score: clamp_score(distraction),
            blink_rate_per_minute,
            long_blink_count,
            fraction_face_missing,
        }
    }

    /// Processor configuration
    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Ticks currently in the window
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Ticks in the window with a face present
    pub fn present_sample_count(&self) -> usize {
        self.present_samples
    }

    /// Blinks currently in the window
    pub fn blink_count(&self) -> usize {
        self.blinks.len()
    }

    /// Long blinks currently in the window
    pub fn long_blink_count(&self) -> usize {
        self.long_blinks.len()
    }

    /// Whether an eye closure has started but not yet ended
    pub fn blink_in_progress(&self) -> bool {
        matches!(self.closure, EyeClosure::Closed { .. })
    }

    /// Clear all windows and blink tracking
    pub fn reset(&mut self) {
        self.samples.clear();
        self.present_samples = 0;
        self.blinks.clear();
        self.long_blinks.clear();
        self.closure = EyeClosure::Open;
        self.last_timestamp = None;
    }
}

impl Default for SignalProcessor {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
