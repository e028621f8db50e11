//! Session orchestration and time accounting

use crate::config::SessionConfig;
use crate::SessionError;
use chrono::{DateTime, Utc};
use focus_state::{FocusEvent, FocusState, FocusStateMachine, StateParams};
use serde::{Deserialize, Serialize};
use signals::{Measurement, SignalConfig, SignalProcessor, SignalScores};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of feeding one tick through the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// State after this tick
    pub state: FocusState,
    /// Scores as seen by the state machine (after detection masking)
    pub scores: SignalScores,
    /// Transition made on this tick, if any
    pub event: Option<FocusEvent>,
}

/// End-of-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Wall-clock start
    pub start_time: DateTime<Utc>,
    /// Wall-clock end
    pub end_time: DateTime<Utc>,
    /// Tick timestamp the session started at
    pub start_timestamp: f64,
    /// Elapsed tick time between start and end (seconds)
    pub duration_seconds: f64,
    pub focused_seconds: f64,
    /// Drowsy warning + alarm
    pub drowsy_seconds: f64,
    /// Distracted warning + alarm
    pub distracted_seconds: f64,
    /// Every transition, in order
    pub events: Vec<FocusEvent>,
}

impl SessionStats {
    fn fraction(&self, seconds: f64) -> f64 {
        if self.duration_seconds > 0.0 {
            seconds / self.duration_seconds
        } else {
            0.0
        }
    }

    /// Share of the session spent focused (0-1)
    pub fn focused_fraction(&self) -> f64 {
        self.fraction(self.focused_seconds)
    }

    /// Share of the session spent drowsy (0-1)
    pub fn drowsy_fraction(&self) -> f64 {
        self.fraction(self.drowsy_seconds)
    }

    /// Share of the session spent distracted (0-1)
    pub fn distracted_fraction(&self) -> f64 {
        self.fraction(self.distracted_seconds)
    }
}

#[derive(Debug, Clone, Copy)]
enum Lifecycle {
    Idle,
    Running {
        start_wall: DateTime<Utc>,
        start_tick: f64,
    },
    Ended {
        start_wall: DateTime<Utc>,
        start_tick: f64,
        end_wall: DateTime<Utc>,
        end_tick: f64,
    },
}

/// One monitoring session: signal processor and state machine plus books
pub struct FocusSession {
    config: SessionConfig,
    signal_processor: SignalProcessor,
    state_machine: FocusStateMachine,
    lifecycle: Lifecycle,
    /// Timestamp and reported state of the previous tick
    last_tick: Option<(f64, FocusState)>,
    last_scores: Option<SignalScores>,
    durations: HashMap<FocusState, f64>,
    events: Vec<FocusEvent>,
}

impl FocusSession {
    /// Create a session after validating all three configurations
    pub fn new(
        config: SessionConfig,
        state_params: StateParams,
        signal_config: SignalConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        state_params.validate()?;
        signal_config.validate()?;

        Ok(Self {
            config,
            signal_processor: SignalProcessor::new(signal_config),
            state_machine: FocusStateMachine::new(state_params),
            lifecycle: Lifecycle::Idle,
            last_tick: None,
            last_scores: None,
            durations: zeroed_durations(),
            events: Vec::new(),
        })
    }

    /// Begin the session at tick `timestamp`, clearing all accumulators
    pub fn start(&mut self, timestamp: f64) {
        if matches!(self.lifecycle, Lifecycle::Running { .. }) {
            warn!("Restarting a session that was still running");
        }

        self.signal_processor.reset();
        self.state_machine.reset();
        self.last_tick = None;
        self.last_scores = None;
        self.durations = zeroed_durations();
        self.events.clear();
        self.lifecycle = Lifecycle::Running {
            start_wall: Utc::now(),
            start_tick: timestamp,
        };

        info!("Focus session started at {:.3} ({:?})", timestamp, self.config);
    }

    /// Feed one tick of measurements.
    ///
    /// Time since the previous tick is credited to the state reported on
    /// that previous tick, not to the state this tick produces.
    pub fn update(
        &mut self,
        timestamp: f64,
        measurement: &Measurement,
    ) -> Result<TickOutcome, SessionError> {
        match self.lifecycle {
            Lifecycle::Idle => return Err(SessionError::NotStarted),
            Lifecycle::Ended { .. } => return Err(SessionError::AlreadyEnded),
            Lifecycle::Running { .. } => {}
        }

        self.credit_elapsed(timestamp);

        let raw = self
            .signal_processor
            .update_measurement(timestamp, measurement);
        let scores = self.apply_detection_mask(raw);
        let (state, event) = self.state_machine.update(timestamp, &scores);

        if let Some(event) = event {
            debug!("Recording event {} at {:.3}", event.kind, event.timestamp);
            self.events.push(event);
        }

        self.last_tick = Some((timestamp, state));
        self.last_scores = Some(scores);

        Ok(TickOutcome {
            state,
            scores,
            event,
        })
    }

    /// Close the session at tick `timestamp`, crediting the final interval.
    ///
    /// Ending an already-ended session is a no-op.
    pub fn end(&mut self, timestamp: f64) -> Result<(), SessionError> {
        let (start_wall, start_tick) = match self.lifecycle {
            Lifecycle::Idle => return Err(SessionError::NotStarted),
            Lifecycle::Ended { .. } => {
                warn!("Session already ended, ignoring end at {:.3}", timestamp);
                return Ok(());
            }
            Lifecycle::Running {
                start_wall,
                start_tick,
            } => (start_wall, start_tick),
        };

        self.credit_elapsed(timestamp);
        self.lifecycle = Lifecycle::Ended {
            start_wall,
            start_tick,
            end_wall: Utc::now(),
            end_tick: timestamp,
        };

        info!(
            "Focus session ended after {:.1}s with {} events",
            (timestamp - start_tick).max(0.0),
            self.events.len()
        );
        Ok(())
    }

    /// Summary of a completed session
    pub fn summary(&self) -> Result<SessionStats, SessionError> {
        let (start_wall, start_tick, end_wall, end_tick) = match self.lifecycle {
            Lifecycle::Idle => return Err(SessionError::NotStarted),
            Lifecycle::Running { .. } => return Err(SessionError::NotCompleted),
            Lifecycle::Ended {
                start_wall,
                start_tick,
                end_wall,
                end_tick,
            } => (start_wall, start_tick, end_wall, end_tick),
        };

        let seconds = |state: FocusState| self.durations.get(&state).copied().unwrap_or(0.0);

        Ok(SessionStats {
            start_time: start_wall,
            end_time: end_wall,
            start_timestamp: start_tick,
            duration_seconds: (end_tick - start_tick).max(0.0),
            focused_seconds: seconds(FocusState::Focused),
            drowsy_seconds: seconds(FocusState::DrowsyWarning) + seconds(FocusState::DrowsyAlarm),
            distracted_seconds: seconds(FocusState::DistractedWarning)
                + seconds(FocusState::DistractedAlarm),
            events: self.events.clone(),
        })
    }

    /// Whether the configured target duration has elapsed at `now`
    pub fn target_reached(&self, now: f64) -> bool {
        match (self.config.target_duration_seconds, self.elapsed(now)) {
            (Some(target), Some(elapsed)) => elapsed >= target,
            _ => false,
        }
    }

    /// Tick time since start, while running
    pub fn elapsed(&self, now: f64) -> Option<f64> {
        match self.lifecycle {
            Lifecycle::Running { start_tick, .. } => Some((now - start_tick).max(0.0)),
            _ => None,
        }
    }

    /// JSON snapshot of every setting that shaped this session
    pub fn config_json(&self) -> Result<String, SessionError> {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            session: &'a SessionConfig,
            state_params: &'a StateParams,
            signal_config: &'a SignalConfig,
        }

        Ok(serde_json::to_string(&Snapshot {
            session: &self.config,
            state_params: self.state_machine.params(),
            signal_config: self.signal_processor.config(),
        })?)
    }

    /// State reported on the latest tick
    pub fn current_state(&self) -> FocusState {
        self.state_machine.state()
    }

    /// Scores from the latest tick
    pub fn last_scores(&self) -> Option<&SignalScores> {
        self.last_scores.as_ref()
    }

    /// Transitions recorded so far
    pub fn events(&self) -> &[FocusEvent] {
        &self.events
    }

    /// Accumulated seconds in one state
    pub fn seconds_in(&self, state: FocusState) -> f64 {
        self.durations.get(&state).copied().unwrap_or(0.0)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running { .. })
    }

    fn credit_elapsed(&mut self, timestamp: f64) {
        if let Some((last_timestamp, last_state)) = self.last_tick {
            let dt = (timestamp - last_timestamp).max(0.0);
            *self.durations.entry(last_state).or_insert(0.0) += dt;
        }
    }

    fn apply_detection_mask(&self, scores: SignalScores) -> SignalScores {
        SignalScores {
            drowsiness_score: if self.config.detect_drowsiness {
                scores.drowsiness_score
            } else {
                0.0
            },
            distraction_score: if self.config.detect_distraction {
                scores.distraction_score
            } else {
                0.0
            },
            ..scores
        }
    }
}

fn zeroed_durations() -> HashMap<FocusState, f64> {
    FocusState::ALL.into_iter().map(|state| (state, 0.0)).collect()
}
