//! Layered monitor settings

use crate::MonitorError;
use alerting::AlarmConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use session::{FocusSession, SensitivityProfile, SessionConfig, SessionError};
use std::path::Path;
use tracing::warn;

/// Prefix of environment overrides (`FOCUS_ALARM_COOLDOWN_SECONDS=5`)
pub const ENV_PREFIX: &str = "FOCUS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// User-facing settings, flattened for file and environment overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// "Chill", "Balanced" or "Strict"
    pub sensitivity_profile: String,
    /// Calibrated eye threshold, replaces the profile's value
    pub eye_aspect_ratio_threshold: Option<f64>,
    pub detect_drowsiness: bool,
    pub detect_distraction: bool,
    pub target_duration_seconds: Option<f64>,
    pub drowsy_alarm_enabled: bool,
    pub distracted_alarm_enabled: bool,
    pub alarm_cooldown_seconds: f64,
    pub log_format: LogFormat,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        let session = SessionConfig::default();
        let alarm = AlarmConfig::default();
        Self {
            sensitivity_profile: SensitivityProfile::default().to_string(),
            eye_aspect_ratio_threshold: None,
            detect_drowsiness: session.detect_drowsiness,
            detect_distraction: session.detect_distraction,
            target_duration_seconds: session.target_duration_seconds,
            drowsy_alarm_enabled: alarm.drowsy_enabled,
            distracted_alarm_enabled: alarm.distracted_enabled,
            alarm_cooldown_seconds: alarm.cooldown_seconds,
            log_format: LogFormat::default(),
        }
    }
}

impl MonitorSettings {
    /// Defaults, then the optional file, then `FOCUS_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Same layering with an explicit environment source
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, MonitorError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Selected profile; unknown names fall back to the default
    pub fn profile(&self) -> SensitivityProfile {
        self.sensitivity_profile.parse().unwrap_or_else(|err| {
            let fallback = SensitivityProfile::default();
            warn!("{}, using {}", err, fallback);
            fallback
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            detect_drowsiness: self.detect_drowsiness,
            detect_distraction: self.detect_distraction,
            target_duration_seconds: self.target_duration_seconds,
        }
    }

    pub fn alarm_config(&self) -> AlarmConfig {
        AlarmConfig {
            cooldown_seconds: self.alarm_cooldown_seconds,
            drowsy_enabled: self.drowsy_alarm_enabled,
            distracted_enabled: self.distracted_alarm_enabled,
        }
    }

    /// Session wired with the profile's parameters and any calibration
    pub fn build_session(&self) -> Result<FocusSession, SessionError> {
        let (state_params, signal_config) = self
            .profile()
            .params_with_calibration(self.eye_aspect_ratio_threshold);
        FocusSession::new(self.session_config(), state_params, signal_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = MonitorSettings::load_with(None, no_env()).unwrap();
        assert_eq!(settings, MonitorSettings::default());
        assert_eq!(settings.profile(), SensitivityProfile::Balanced);
        assert_eq!(settings.alarm_config(), AlarmConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "sensitivity_profile = \"strict\"\nalarm_cooldown_seconds = 30.0\nlog_format = \"json\""
        )
        .unwrap();

        let settings = MonitorSettings::load_with(Some(file.path()), no_env()).unwrap();
        assert_eq!(settings.profile(), SensitivityProfile::Strict);
        assert_eq!(settings.alarm_cooldown_seconds, 30.0);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert!(settings.detect_drowsiness);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "detect_distraction = true\ntarget_duration_seconds = 600.0").unwrap();

        let env = Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::from([
            ("FOCUS_DETECT_DISTRACTION".to_string(), "false".to_string()),
            ("FOCUS_EYE_ASPECT_RATIO_THRESHOLD".to_string(), "0.19".to_string()),
        ])));

        let settings = MonitorSettings::load_with(Some(file.path()), env).unwrap();
        assert!(!settings.detect_distraction);
        assert_eq!(settings.eye_aspect_ratio_threshold, Some(0.19));
        assert_eq!(settings.target_duration_seconds, Some(600.0));
    }

    #[test]
    fn test_unknown_profile_falls_back() {
        let settings = MonitorSettings {
            sensitivity_profile: "turbo".into(),
            ..Default::default()
        };
        assert_eq!(settings.profile(), SensitivityProfile::Balanced);
    }

    #[test]
    fn test_build_session_applies_calibration() {
        let settings = MonitorSettings {
            sensitivity_profile: "Chill".into(),
            eye_aspect_ratio_threshold: Some(0.2),
            target_duration_seconds: Some(120.0),
            ..Default::default()
        };
        let session = settings.build_session().unwrap();
        let json: serde_json::Value = serde_json::from_str(&session.config_json().unwrap()).unwrap();

        assert_eq!(json["signal_config"]["eye_aspect_ratio_threshold"], 0.2);
        assert_eq!(json["state_params"]["drowsy_warning_threshold"], 70.0);
        assert_eq!(json["session"]["target_duration_seconds"], 120.0);
    }

    #[test]
    fn test_invalid_target_rejected() {
        let settings = MonitorSettings {
            target_duration_seconds: Some(-1.0),
            ..Default::default()
        };
        assert!(settings.build_session().is_err());
    }
}
