//! Sensitivity profiles

use crate::SessionError;
use focus_state::StateParams;
use serde::{Deserialize, Serialize};
use signals::SignalConfig;
use std::fmt;
use std::str::FromStr;

/// Named pairing of state thresholds and signal weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensitivityProfile {
    Chill,
    #[default]
    Balanced,
    Strict,
}

impl SensitivityProfile {
    /// State parameters and signal config for this profile
    pub fn params(&self) -> (StateParams, SignalConfig) {
        match self {
            Self::Chill => (StateParams::chill(), SignalConfig::chill()),
            Self::Balanced => (StateParams::balanced(), SignalConfig::balanced()),
            Self::Strict => (StateParams::strict(), SignalConfig::strict()),
        }
    }

    /// Profile parameters with a calibrated eye threshold taking precedence
    pub fn params_with_calibration(
        &self,
        eye_aspect_ratio_threshold: Option<f64>,
    ) -> (StateParams, SignalConfig) {
        let (state_params, mut signal_config) = self.params();
        if let Some(threshold) = eye_aspect_ratio_threshold {
            signal_config.eye_aspect_ratio_threshold = threshold;
        }
        (state_params, signal_config)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chill => "Chill",
            Self::Balanced => "Balanced",
            Self::Strict => "Strict",
        }
    }
}

impl fmt::Display for SensitivityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensitivityProfile {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chill" => Ok(Self::Chill),
            "balanced" => Ok(Self::Balanced),
            "strict" => Ok(Self::Strict),
            _ => Err(SessionError::UnknownProfile(s.to_string())),
        }
    }
}
