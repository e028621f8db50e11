//! Persistence records for completed sessions

use crate::session::SessionStats;
use crate::SessionError;
use chrono::{DateTime, TimeDelta, Utc};
use focus_state::{FocusEvent, FocusState};
use serde::{Deserialize, Serialize};

/// One row per completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub focused_seconds: i64,
    pub drowsy_seconds: i64,
    pub distracted_seconds: i64,
    pub config_json: String,
    pub notes: Option<String>,
}

/// One row per state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub details_json: String,
}

/// Payload stored in `EventRecord::details_json`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub from_state: FocusState,
    pub to_state: FocusState,
    pub drowsiness_score: f64,
    pub distraction_score: f64,
}

impl From<&FocusEvent> for EventDetails {
    fn from(event: &FocusEvent) -> Self {
        Self {
            from_state: event.from_state,
            to_state: event.to_state,
            drowsiness_score: event.drowsiness_score,
            distraction_score: event.distraction_score,
        }
    }
}

impl SessionStats {
    /// Session row plus one event row per transition
    pub fn to_records(
        &self,
        config_json: &str,
    ) -> Result<(SessionRecord, Vec<EventRecord>), SessionError> {
        Ok((self.session_record(config_json, None), self.event_records()?))
    }

    /// Session row with seconds rounded to whole numbers
    pub fn session_record(&self, config_json: &str, notes: Option<String>) -> SessionRecord {
        SessionRecord {
            start_time: self.start_time,
            end_time: self.end_time,
            duration_seconds: whole_seconds(self.duration_seconds),
            focused_seconds: whole_seconds(self.focused_seconds),
            drowsy_seconds: whole_seconds(self.drowsy_seconds),
            distracted_seconds: whole_seconds(self.distracted_seconds),
            config_json: config_json.to_string(),
            notes,
        }
    }

    /// Event rows stamped with wall-clock time relative to the session start
    pub fn event_records(&self) -> Result<Vec<EventRecord>, SessionError> {
        self.events
            .iter()
            .map(|event| {
                Ok(EventRecord {
                    timestamp: self.wall_clock(event.timestamp)?,
                    event_type: event.kind.as_str().to_string(),
                    details_json: serde_json::to_string(&EventDetails::from(event))?,
                })
            })
            .collect()
    }

    /// Wall-clock time of a tick timestamp
    pub fn wall_clock(&self, timestamp: f64) -> Result<DateTime<Utc>, SessionError> {
        let offset_ms = ((timestamp - self.start_timestamp) * 1000.0).round();
        if !offset_ms.is_finite() {
            return Err(SessionError::TimestampOutOfRange(timestamp));
        }

        TimeDelta::try_milliseconds(offset_ms as i64)
            .and_then(|offset| self.start_time.checked_add_signed(offset))
            .ok_or(SessionError::TimestampOutOfRange(timestamp))
    }
}

// Half-way values round to even, matching previously stored history
fn whole_seconds(seconds: f64) -> i64 {
    seconds.round_ties_even() as i64
}
