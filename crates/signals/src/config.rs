//! Signal processing configuration

use crate::SignalError;
use serde::{Deserialize, Serialize};

/// Signal processor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Length of the trailing observation window (seconds)
    pub window_duration_seconds: f64,

    /// Eye-openness ratio below which the eyes count as closed
    pub eye_aspect_ratio_threshold: f64,

    /// Shortest closure that counts as a blink (seconds)
    pub minimum_blink_duration_seconds: f64,

    /// Shortest closure that counts as a long blink (seconds)
    pub minimum_long_blink_duration_seconds: f64,

    /// Blink rate considered normal (blinks per minute)
    pub baseline_blink_rate_per_minute: f64,

    /// Drowsiness points per long blink in the window
    pub drowsiness_long_blink_weight: f64,

    /// Drowsiness points per blink/min above baseline
    pub drowsiness_blink_rate_weight: f64,

    /// Distraction points per unit of face-missing fraction
    pub distraction_face_missing_weight: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            window_duration_seconds: 20.0,
            eye_aspect_ratio_threshold: 0.22,
            minimum_blink_duration_seconds: 0.1,
            minimum_long_blink_duration_seconds: 0.4,
            baseline_blink_rate_per_minute: 20.0,
            drowsiness_long_blink_weight: 35.0,
            drowsiness_blink_rate_weight: 1.5,
            distraction_face_missing_weight: 100.0,
        }
    }
}

impl SignalConfig {
    /// Relaxed profile: longer window, fewer points per blink
    pub fn chill() -> Self {
        Self {
            window_duration_seconds: 25.0,
            eye_aspect_ratio_threshold: 0.21,
            minimum_blink_duration_seconds: 0.12,
            minimum_long_blink_duration_seconds: 0.45,
            baseline_blink_rate_per_minute: 18.0,
            drowsiness_long_blink_weight: 30.0,
            drowsiness_blink_rate_weight: 1.2,
            distraction_face_missing_weight: 80.0,
        }
    }

    /// Everyday profile with a short 10s window
    pub fn balanced() -> Self {
        Self {
            window_duration_seconds: 10.0,
            ..Default::default()
        }
    }

    /// Sensitive profile: short window, heavier weights
    pub fn strict() -> Self {
        Self {
            window_duration_seconds: 15.0,
            eye_aspect_ratio_threshold: 0.23,
            minimum_blink_duration_seconds: 0.08,
            minimum_long_blink_duration_seconds: 0.35,
            baseline_blink_rate_per_minute: 22.0,
            drowsiness_long_blink_weight: 40.0,
            drowsiness_blink_rate_weight: 2.0,
            distraction_face_missing_weight: 120.0,
        }
    }

    /// Check that durations and rates are positive and weights non-negative
    pub fn validate(&self) -> Result<(), SignalError> {
        require_positive("window_duration_seconds", self.window_duration_seconds)?;
        require_positive("eye_aspect_ratio_threshold", self.eye_aspect_ratio_threshold)?;
        require_positive(
            "minimum_blink_duration_seconds",
            self.minimum_blink_duration_seconds,
        )?;
        require_positive(
            "minimum_long_blink_duration_seconds",
            self.minimum_long_blink_duration_seconds,
        )?;
        require_positive(
            "baseline_blink_rate_per_minute",
            self.baseline_blink_rate_per_minute,
        )?;
        require_non_negative("drowsiness_long_blink_weight", self.drowsiness_long_blink_weight)?;
        require_non_negative("drowsiness_blink_rate_weight", self.drowsiness_blink_rate_weight)?;
        require_non_negative(
            "distraction_face_missing_weight",
            self.distraction_face_missing_weight,
        )?;
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), SignalError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SignalError::InvalidConfig {
            field,
            value,
            reason: "must be positive",
        })
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), SignalError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SignalError::InvalidConfig {
            field,
            value,
            reason: "must not be negative",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_are_valid() {
        assert!(SignalConfig::default().validate().is_ok());
        assert!(SignalConfig::chill().validate().is_ok());
        assert!(SignalConfig::balanced().validate().is_ok());
        assert!(SignalConfig::strict().validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = SignalConfig {
            window_duration_seconds: 0.0,
            ..Default::default()
        };
        match config.validate() {
            Err(SignalError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "window_duration_seconds");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = SignalConfig {
            drowsiness_blink_rate_weight: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let config = SignalConfig {
            eye_aspect_ratio_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
