//! Alarm Gate Implementation

use crate::AlarmError;
use focus_state::{FocusEvent, FocusEventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Kind of user-facing alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmKind {
    Drowsy,
    Distracted,
}

impl AlarmKind {
    /// Alarm raised by a transition, if any.
    ///
    /// Only entering an alarm state raises one.
    pub fn for_event(event: &FocusEvent) -> Option<Self> {
        match event.kind {
            FocusEventKind::EnterDrowsyAlarm => Some(Self::Drowsy),
            FocusEventKind::EnterDistractedAlarm => Some(Self::Distracted),
            _ => None,
        }
    }

    /// Stable identifier for storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drowsy => "DROWSY",
            Self::Distracted => "DISTRACTED",
        }
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alarm configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Minimum time between two alarms of the same kind (seconds)
    pub cooldown_seconds: f64,
    /// Raise drowsy alarms
    pub drowsy_enabled: bool,
    /// Raise distracted alarms
    pub distracted_enabled: bool,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 10.0,
            drowsy_enabled: true,
            distracted_enabled: true,
        }
    }
}

impl AlarmConfig {
    /// Check the cooldown is a finite, non-negative duration
    pub fn validate(&self) -> Result<(), AlarmError> {
        if self.cooldown_seconds.is_finite() && self.cooldown_seconds >= 0.0 {
            Ok(())
        } else {
            Err(AlarmError::InvalidConfig {
                field: "cooldown_seconds",
                value: self.cooldown_seconds,
                reason: "must not be negative",
            })
        }
    }

    fn is_enabled(&self, kind: AlarmKind) -> bool {
        match kind {
            AlarmKind::Drowsy => self.drowsy_enabled,
            AlarmKind::Distracted => self.distracted_enabled,
        }
    }
}

/// Firing history of one alarm kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmState {
    /// Tick timestamp of the last fired alarm
    pub last_fired: f64,
    /// Number of times fired
    pub fire_count: usize,
}

/// Cooldown gate between state transitions and alarm presentation
pub struct AlarmGate {
    config: AlarmConfig,
    states: HashMap<AlarmKind, AlarmState>,
}

impl AlarmGate {
    /// Create a new alarm gate
    pub fn new(config: AlarmConfig) -> Self {
        info!("Creating alarm gate with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Decide whether `event` should raise an alarm now.
    ///
    /// The cooldown clock of a kind only moves when an alarm of that kind
    /// actually fires.
    pub fn process_event(&mut self, event: &FocusEvent) -> Option<AlarmKind> {
        let kind = AlarmKind::for_event(event)?;

        if !self.config.is_enabled(kind) {
            debug!("Alarm suppressed: {} alarms disabled", kind);
            return None;
        }

        if let Some(state) = self.states.get(&kind) {
            let since_last = event.timestamp - state.last_fired;
            if since_last < self.config.cooldown_seconds {
                debug!(
                    "Alarm suppressed: {} in cooldown ({:.1}s of {:.1}s)",
                    kind, since_last, self.config.cooldown_seconds
                );
                return None;
            }
        }

        let state = self.states.entry(kind).or_insert(AlarmState {
            last_fired: event.timestamp,
            fire_count: 0,
        });
        state.last_fired = event.timestamp;
        state.fire_count += 1;

        info!("Alarm fired: {} (count: {})", kind, state.fire_count);
        Some(kind)
    }

    /// Firing history for a kind
    pub fn state(&self, kind: AlarmKind) -> Option<&AlarmState> {
        self.states.get(&kind)
    }

    /// Gate configuration
    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    /// Forget all firing history
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl Default for AlarmGate {
    fn default() -> Self {
        Self::new(AlarmConfig::default())
    }
}
