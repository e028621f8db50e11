//! Measurement replay driver
//!
//! A reader task parses JSON Lines into ticks and hands them over a bounded
//! channel to the session loop, which drives the `FocusSession`, routes
//! transitions through the `AlarmGate` and ends the session at the target
//! duration or end of input.

use crate::MonitorError;
use alerting::{AlarmGate, AlarmKind};
use serde::{Deserialize, Serialize};
use session::{EventRecord, FocusSession, SessionRecord, SessionStats};
use signals::Measurement;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One input line: `{"timestamp":..,"face_present":..,"left_eye_ratio":..,"right_eye_ratio":..}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub timestamp: f64,
    #[serde(flatten)]
    pub measurement: Measurement,
}

/// Line counts from the reader task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderSummary {
    pub ticks: usize,
    pub skipped: usize,
}

/// An alarm that passed the gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiredAlarm {
    pub timestamp: f64,
    pub kind: AlarmKind,
}

/// Outcome of one replayed session
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub stats: SessionStats,
    pub config_json: String,
    pub alarms: Vec<FiredAlarm>,
    /// Whether the session stopped at its target duration
    pub target_reached: bool,
}

/// JSON document printed at the end of a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutput {
    pub session: SessionRecord,
    pub events: Vec<EventRecord>,
    pub alarms: Vec<FiredAlarm>,
}

impl ReplayReport {
    pub fn to_output(&self, notes: Option<String>) -> Result<ReplayOutput, MonitorError> {
        Ok(ReplayOutput {
            session: self.stats.session_record(&self.config_json, notes),
            events: self.stats.event_records()?,
            alarms: self.alarms.clone(),
        })
    }
}

/// Spawn a task parsing JSON Lines from `reader` into a bounded channel.
///
/// Blank lines are ignored and malformed lines are skipped with a warning.
/// The task stops early once the receiver is dropped.
pub fn spawn_reader<R>(
    reader: R,
    capacity: usize,
) -> (
    mpsc::Receiver<TickInput>,
    JoinHandle<Result<ReaderSummary, MonitorError>>,
)
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<TickInput>(capacity.max(1));

    let handle = tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut summary = ReaderSummary::default();
        let mut line_number = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let tick = match serde_json::from_str::<TickInput>(line) {
                Ok(tick) => tick,
                Err(e) => {
                    warn!("Skipping line {}: {}", line_number, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            if tx.send(tick).await.is_err() {
                debug!("Session loop stopped, reader exiting at line {}", line_number);
                break;
            }
            summary.ticks += 1;
        }

        Ok::<_, MonitorError>(summary)
    });

    (rx, handle)
}

/// Drive `session` from the channel until the target duration or end of input.
///
/// The session starts at the first tick's timestamp and ends at the last
/// one processed.
pub async fn run_session(
    mut session: FocusSession,
    mut gate: AlarmGate,
    mut rx: mpsc::Receiver<TickInput>,
) -> Result<ReplayReport, MonitorError> {
    gate.config().validate()?;

    let mut alarms = Vec::new();
    let mut last_timestamp = None;
    let mut target_reached = false;

    while let Some(tick) = rx.recv().await {
        if last_timestamp.is_none() {
            session.start(tick.timestamp);
        }

        let outcome = session.update(tick.timestamp, &tick.measurement)?;
        last_timestamp = Some(tick.timestamp);

        if let Some(event) = outcome.event {
            if let Some(kind) = gate.process_event(&event) {
                warn!(
                    "ALARM {} at {:.1}s (drowsiness {:.0}, distraction {:.0})",
                    kind,
                    session.elapsed(tick.timestamp).unwrap_or(0.0),
                    event.drowsiness_score,
                    event.distraction_score
                );
                alarms.push(FiredAlarm {
                    timestamp: event.timestamp,
                    kind,
                });
            }
        }

        if session.target_reached(tick.timestamp) {
            info!("Target duration reached at {:.3}", tick.timestamp);
            target_reached = true;
            break;
        }
    }
    drop(rx);

    let end_timestamp = last_timestamp.ok_or(MonitorError::EmptyInput)?;
    session.end(end_timestamp)?;

    let stats = session.summary()?;
    info!(
        "Session summary: {:.0}s focused, {:.0}s drowsy, {:.0}s distracted, {} alarms",
        stats.focused_seconds,
        stats.drowsy_seconds,
        stats.distracted_seconds,
        alarms.len()
    );

    Ok(ReplayReport {
        stats,
        config_json: session.config_json()?,
        alarms,
        target_reached,
    })
}
