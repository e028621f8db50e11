//! Session configuration

use crate::SessionError;
use serde::{Deserialize, Serialize};

/// Per-session detection switches and length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Feed the drowsiness score to the state machine (otherwise forced to 0)
    pub detect_drowsiness: bool,

    /// Feed the distraction score to the state machine (otherwise forced to 0)
    pub detect_distraction: bool,

    /// Planned session length (seconds), open-ended when `None`
    pub target_duration_seconds: Option<f64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            detect_drowsiness: true,
            detect_distraction: true,
            target_duration_seconds: None,
        }
    }
}

impl SessionConfig {
    /// Check the target duration, when set, is positive
    pub fn validate(&self) -> Result<(), SessionError> {
        match self.target_duration_seconds {
            Some(target) if !(target.is_finite() && target > 0.0) => {
                Err(SessionError::InvalidConfig {
                    field: "target_duration_seconds",
                    value: target,
                    reason: "must be positive",
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_detects_both() {
        let config = SessionConfig::default();
        assert!(config.detect_drowsiness);
        assert!(config.detect_distraction);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_target_rejected() {
        let config = SessionConfig {
            target_duration_seconds: Some(0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
