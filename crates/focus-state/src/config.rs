//! State machine thresholds and dwell durations

use crate::StateError;
use serde::{Deserialize, Serialize};

/// Transition thresholds (0-100 score scale) and dwell times (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateParams {
    pub drowsy_warning_threshold: f64,
    pub drowsy_alarm_threshold: f64,
    pub distracted_warning_threshold: f64,
    pub distracted_alarm_threshold: f64,

    /// Time drowsiness must stay at/above warning before Focused -> DrowsyWarning
    pub min_drowsy_warning_duration: f64,
    /// Time drowsiness must stay at/above alarm before DrowsyWarning -> DrowsyAlarm
    pub min_drowsy_alarm_duration: f64,
    pub min_distracted_warning_duration: f64,
    pub min_distracted_alarm_duration: f64,

    /// Score at or below which drowsiness counts as recovering
    pub drowsy_recovery_threshold: f64,
    /// Score at or below which distraction counts as recovering
    pub distracted_recovery_threshold: f64,

    /// Time a score must stay recovered before returning to Focused
    pub recovery_grace_duration: f64,
}

impl Default for StateParams {
    fn default() -> Self {
        Self {
            drowsy_warning_threshold: 60.0,
            drowsy_alarm_threshold: 80.0,
            distracted_warning_threshold: 60.0,
            distracted_alarm_threshold: 80.0,
            min_drowsy_warning_duration: 3.0,
            min_drowsy_alarm_duration: 2.0,
            min_distracted_warning_duration: 3.0,
            min_distracted_alarm_duration: 2.0,
            drowsy_recovery_threshold: 40.0,
            distracted_recovery_threshold: 40.0,
            recovery_grace_duration: 3.0,
        }
    }
}

impl StateParams {
    /// Lenient thresholds with longer dwell times
    pub fn chill() -> Self {
        Self {
            drowsy_warning_threshold: 70.0,
            drowsy_alarm_threshold: 85.0,
            distracted_warning_threshold: 70.0,
            distracted_alarm_threshold: 85.0,
            min_drowsy_warning_duration: 4.0,
            min_drowsy_alarm_duration: 3.0,
            min_distracted_warning_duration: 4.0,
            min_distracted_alarm_duration: 3.0,
            drowsy_recovery_threshold: 70.0,
            distracted_recovery_threshold: 70.0,
            recovery_grace_duration: 0.0,
        }
    }

    /// Default thresholds with quicker escalation and immediate recovery
    pub fn balanced() -> Self {
        Self {
            min_drowsy_warning_duration: 2.0,
            min_drowsy_alarm_duration: 1.5,
            min_distracted_warning_duration: 2.0,
            min_distracted_alarm_duration: 1.5,
            drowsy_recovery_threshold: 60.0,
            distracted_recovery_threshold: 60.0,
            recovery_grace_duration: 0.0,
            ..Default::default()
        }
    }

    /// Low thresholds with short dwell times
    pub fn strict() -> Self {
        Self {
            drowsy_warning_threshold: 50.0,
            drowsy_alarm_threshold: 70.0,
            distracted_warning_threshold: 50.0,
            distracted_alarm_threshold: 70.0,
            min_drowsy_warning_duration: 2.0,
            min_drowsy_alarm_duration: 1.0,
            min_distracted_warning_duration: 2.0,
            min_distracted_alarm_duration: 1.0,
            drowsy_recovery_threshold: 50.0,
            distracted_recovery_threshold: 50.0,
            recovery_grace_duration: 0.0,
        }
    }

    /// Check thresholds are on the 0-100 scale and durations non-negative
    pub fn validate(&self) -> Result<(), StateError> {
        for (field, value) in [
            ("drowsy_warning_threshold", self.drowsy_warning_threshold),
            ("drowsy_alarm_threshold", self.drowsy_alarm_threshold),
            ("distracted_warning_threshold", self.distracted_warning_threshold),
            ("distracted_alarm_threshold", self.distracted_alarm_threshold),
            ("drowsy_recovery_threshold", self.drowsy_recovery_threshold),
            ("distracted_recovery_threshold", self.distracted_recovery_threshold),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(StateError::InvalidParams {
                    field,
                    value,
                    reason: "must be within [0, 100]",
                });
            }
        }

        for (field, value) in [
            ("min_drowsy_warning_duration", self.min_drowsy_warning_duration),
            ("min_drowsy_alarm_duration", self.min_drowsy_alarm_duration),
            ("min_distracted_warning_duration", self.min_distracted_warning_duration),
            ("min_distracted_alarm_duration", self.min_distracted_alarm_duration),
            ("recovery_grace_duration", self.recovery_grace_duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StateError::InvalidParams {
                    field,
                    value,
                    reason: "must not be negative",
                });
            }
        }

        Ok(())
    }
}
