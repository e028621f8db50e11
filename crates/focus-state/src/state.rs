//! Attentiveness states and transition events

use crate::StateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete attentiveness state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusState {
    #[default]
    Focused,
    DrowsyWarning,
    DrowsyAlarm,
    DistractedWarning,
    DistractedAlarm,
}

impl FocusState {
    /// Every state, in declaration order
    pub const ALL: [FocusState; 5] = [
        FocusState::Focused,
        FocusState::DrowsyWarning,
        FocusState::DrowsyAlarm,
        FocusState::DistractedWarning,
        FocusState::DistractedAlarm,
    ];

    /// Stable identifier for storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focused => "FOCUSED",
            Self::DrowsyWarning => "DROWSY_WARNING",
            Self::DrowsyAlarm => "DROWSY_ALARM",
            Self::DistractedWarning => "DISTRACTED_WARNING",
            Self::DistractedAlarm => "DISTRACTED_ALARM",
        }
    }

    /// Warning or alarm on the drowsy branch
    pub fn is_drowsy(&self) -> bool {
        matches!(self, Self::DrowsyWarning | Self::DrowsyAlarm)
    }

    /// Warning or alarm on the distracted branch
    pub fn is_distracted(&self) -> bool {
        matches!(self, Self::DistractedWarning | Self::DistractedAlarm)
    }

    /// Either alarm state
    pub fn is_alarm(&self) -> bool {
        matches!(self, Self::DrowsyAlarm | Self::DistractedAlarm)
    }
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusState {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| StateError::UnknownState(s.to_string()))
    }
}

/// Kind of transition, one per destination state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusEventKind {
    EnterFocused,
    EnterDrowsyWarning,
    EnterDrowsyAlarm,
    EnterDistractedWarning,
    EnterDistractedAlarm,
}

impl FocusEventKind {
    /// Event kind for entering `state`
    pub fn entering(state: FocusState) -> Self {
        match state {
            FocusState::Focused => Self::EnterFocused,
            FocusState::DrowsyWarning => Self::EnterDrowsyWarning,
            FocusState::DrowsyAlarm => Self::EnterDrowsyAlarm,
            FocusState::DistractedWarning => Self::EnterDistractedWarning,
            FocusState::DistractedAlarm => Self::EnterDistractedAlarm,
        }
    }

    /// Destination state of this kind of transition
    pub fn target(&self) -> FocusState {
        match self {
            Self::EnterFocused => FocusState::Focused,
            Self::EnterDrowsyWarning => FocusState::DrowsyWarning,
            Self::EnterDrowsyAlarm => FocusState::DrowsyAlarm,
            Self::EnterDistractedWarning => FocusState::DistractedWarning,
            Self::EnterDistractedAlarm => FocusState::DistractedAlarm,
        }
    }

    /// Stable identifier for storage and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnterFocused => "ENTER_FOCUSED",
            Self::EnterDrowsyWarning => "ENTER_DROWSY_WARNING",
            Self::EnterDrowsyAlarm => "ENTER_DROWSY_ALARM",
            Self::EnterDistractedWarning => "ENTER_DISTRACTED_WARNING",
            Self::EnterDistractedAlarm => "ENTER_DISTRACTED_ALARM",
        }
    }
}

impl fmt::Display for FocusEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusEventKind {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FocusState::ALL
            .into_iter()
            .map(Self::entering)
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StateError::UnknownEvent(s.to_string()))
    }
}

/// A single state transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusEvent {
    /// Monotonic tick timestamp (seconds)
    pub timestamp: f64,
    /// Transition kind
    #[serde(rename = "type")]
    pub kind: FocusEventKind,
    /// State before the transition
    pub from_state: FocusState,
    /// State after the transition
    pub to_state: FocusState,
    /// Drowsiness score that triggered it
    pub drowsiness_score: f64,
    /// Distraction score that triggered it
    pub distraction_score: f64,
}
