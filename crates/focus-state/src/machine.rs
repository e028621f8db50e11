//! Hysteresis state machine

use crate::config::StateParams;
use crate::state::{FocusEvent, FocusEventKind, FocusState};
use signals::SignalScores;
use tracing::{debug, info, warn};

/// Continuous time each score condition has held (seconds).
///
/// A timer drops back to zero on the first tick its condition fails.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DwellTimers {
    pub above_drowsy_warning: f64,
    pub above_drowsy_alarm: f64,
    pub above_distracted_warning: f64,
    pub above_distracted_alarm: f64,
    pub below_drowsy_recovery: f64,
    pub below_distracted_recovery: f64,
}

impl DwellTimers {
    fn advance(&mut self, dt: f64, scores: &SignalScores, params: &StateParams) {
        let drowsiness = scores.drowsiness_score;
        let distraction = scores.distraction_score;

        accumulate(
            &mut self.above_drowsy_warning,
            drowsiness >= params.drowsy_warning_threshold,
            dt,
        );
        accumulate(
            &mut self.above_drowsy_alarm,
            drowsiness >= params.drowsy_alarm_threshold,
            dt,
        );
        accumulate(
            &mut self.above_distracted_warning,
            distraction >= params.distracted_warning_threshold,
            dt,
        );
        accumulate(
            &mut self.above_distracted_alarm,
            distraction >= params.distracted_alarm_threshold,
            dt,
        );
        accumulate(
            &mut self.below_drowsy_recovery,
            drowsiness <= params.drowsy_recovery_threshold,
            dt,
        );
        accumulate(
            &mut self.below_distracted_recovery,
            distraction <= params.distracted_recovery_threshold,
            dt,
        );
    }
}

fn accumulate(timer: &mut f64, holds: bool, dt: f64) {
    if holds {
        *timer += dt;
    } else {
        *timer = 0.0;
    }
}

/// Which transition guards are satisfied on this tick
#[derive(Debug, Clone, Copy, Default)]
struct Triggers {
    drowsy_warning: bool,
    drowsy_alarm: bool,
    drowsy_recovered: bool,
    distracted_warning: bool,
    distracted_alarm: bool,
    distracted_recovered: bool,
}

impl Triggers {
    fn evaluate(scores: &SignalScores, timers: &DwellTimers, p: &StateParams) -> Self {
        let drowsiness = scores.drowsiness_score;
        let distraction = scores.distraction_score;

        Self {
            drowsy_warning: drowsiness >= p.drowsy_warning_threshold
                && timers.above_drowsy_warning >= p.min_drowsy_warning_duration,
            drowsy_alarm: drowsiness >= p.drowsy_alarm_threshold
                && timers.above_drowsy_alarm >= p.min_drowsy_alarm_duration,
            drowsy_recovered: drowsiness <= p.drowsy_recovery_threshold
                && timers.below_drowsy_recovery >= p.recovery_grace_duration,
            distracted_warning: distraction >= p.distracted_warning_threshold
                && timers.above_distracted_warning >= p.min_distracted_warning_duration,
            distracted_alarm: distraction >= p.distracted_alarm_threshold
                && timers.above_distracted_alarm >= p.min_distracted_alarm_duration,
            distracted_recovered: distraction <= p.distracted_recovery_threshold
                && timers.below_distracted_recovery >= p.recovery_grace_duration,
        }
    }
}

/// Five-state attentiveness machine.
///
/// Drowsy and distracted branches only meet at `Focused`: a warning or
/// alarm on one branch must recover before the other branch can be entered.
/// When both warnings trigger from `Focused` on the same tick, drowsiness wins.
pub struct FocusStateMachine {
    params: StateParams,
    state: FocusState,
    last_timestamp: Option<f64>,
    time_in_state: f64,
    timers: DwellTimers,
}

impl FocusStateMachine {
    /// Create a machine in the `Focused` state
    pub fn new(params: StateParams) -> Self {
        debug!("Creating focus state machine with params: {:?}", params);
        Self {
            params,
            state: FocusState::Focused,
            last_timestamp: None,
            time_in_state: 0.0,
            timers: DwellTimers::default(),
        }
    }

    /// Advance the machine by one tick
    pub fn update(
        &mut self,
        timestamp: f64,
        scores: &SignalScores,
    ) -> (FocusState, Option<FocusEvent>) {
        let dt = match self.last_timestamp {
            None => 0.0,
            Some(last) if timestamp < last => {
                warn!(
                    "Non-monotonic timestamp: {:.3} after {:.3}, dwell delta clamped to zero",
                    timestamp, last
                );
                0.0
            }
            Some(last) => timestamp - last,
        };
        self.last_timestamp = Some(timestamp);
        self.time_in_state += dt;

        self.timers.advance(dt, scores, &self.params);
        let triggers = Triggers::evaluate(scores, &self.timers, &self.params);
        let next = self.next_state(&triggers);

        if next == self.state {
            return (self.state, None);
        }

        let event = FocusEvent {
            timestamp,
            kind: FocusEventKind::entering(next),
            from_state: self.state,
            to_state: next,
            drowsiness_score: scores.drowsiness_score,
            distraction_score: scores.distraction_score,
        };
        info!(
            "Focus state {} -> {} after {:.1}s (drowsiness {:.1}, distraction {:.1})",
            self.state,
            next,
            self.time_in_state,
            scores.drowsiness_score,
            scores.distraction_score
        );

        self.state = next;
        self.time_in_state = 0.0;
        (self.state, Some(event))
    }

    fn next_state(&self, t: &Triggers) -> FocusState {
        use FocusState::*;

        match self.state {
            Focused if t.drowsy_warning => DrowsyWarning,
            Focused if t.distracted_warning => DistractedWarning,
            DrowsyWarning if t.drowsy_alarm => DrowsyAlarm,
            DrowsyWarning | DrowsyAlarm if t.drowsy_recovered => Focused,
            DistractedWarning if t.distracted_alarm => DistractedAlarm,
            DistractedWarning | DistractedAlarm if t.distracted_recovered => Focused,
            current => current,
        }
    }

    /// Current state
    pub fn state(&self) -> FocusState {
        self.state
    }

    /// Seconds since the last transition
    pub fn time_in_state(&self) -> f64 {
        self.time_in_state
    }

    /// Current dwell timers
    pub fn timers(&self) -> &DwellTimers {
        &self.timers
    }

    /// Machine parameters
    pub fn params(&self) -> &StateParams {
        &self.params
    }

    /// Return to `Focused` with cleared timers
    pub fn reset(&mut self) {
        self.state = FocusState::Focused;
        self.last_timestamp = None;
        self.time_in_state = 0.0;
        self.timers = DwellTimers::default();
    }
}

impl Default for FocusStateMachine {
    fn default() -> Self {
        Self::new(StateParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scores(drowsiness: f64, distraction: f64) -> SignalScores {
        SignalScores {
            drowsiness_score: drowsiness,
            distraction_score: distraction,
            ..Default::default()
        }
    }

    /// Feed `value` as drowsiness on ticks spaced `step` apart over [start, end]
    fn hold_drowsiness(
        machine: &mut FocusStateMachine,
        start: f64,
        end: f64,
        step: f64,
        value: f64,
    ) -> Vec<FocusEvent> {
        let mut events = Vec::new();
        let mut i = 0;
        loop {
            let t = start + i as f64 * step;
            if t > end + 1e-9 {
                break;
            }
            if let (_, Some(event)) = machine.update(t, &scores(value, 0.0)) {
                events.push(event);
            }
            i += 1;
        }
        events
    }

    #[test]
    fn test_starts_focused() {
        let machine = FocusStateMachine::default();
        assert_eq!(machine.state(), FocusState::Focused);
        assert_eq!(machine.time_in_state(), 0.0);
    }

    #[test]
    fn test_dwell_below_minimum_never_warns() {
        let mut machine = FocusStateMachine::new(StateParams {
            drowsy_warning_threshold: 60.0,
            min_drowsy_warning_duration: 3.0,
            ..Default::default()
        });

        let mut events = hold_drowsiness(&mut machine, 0.0, 2.75, 0.25, 60.0);
        if let (_, Some(event)) = machine.update(2.9, &scores(60.0, 0.0)) {
            events.push(event);
        }
        events.extend(hold_drowsiness(&mut machine, 3.0, 10.0, 0.25, 0.0));

        assert!(events.is_empty());
        assert_eq!(machine.state(), FocusState::Focused);
    }

    #[test]
    fn test_dwell_reaching_minimum_warns_once() {
        let mut machine = FocusStateMachine::new(StateParams {
            drowsy_warning_threshold: 60.0,
            min_drowsy_warning_duration: 3.0,
            ..Default::default()
        });

        let events = hold_drowsiness(&mut machine, 0.0, 3.1, 0.25, 60.0);
        let events: Vec<_> = events
            .into_iter()
            .chain(machine.update(3.1, &scores(60.0, 0.0)).1)
            .collect();

        assert_eq!(events.len(), 1);
        let event = events[0];
        assert_eq!(event.timestamp, 3.0);
        assert_eq!(event.kind, FocusEventKind::EnterDrowsyWarning);
        assert_eq!(event.from_state, FocusState::Focused);
        assert_eq!(event.to_state, FocusState::DrowsyWarning);
        assert_eq!(event.drowsiness_score, 60.0);
        assert_eq!(machine.state(), FocusState::DrowsyWarning);
    }

    #[test]
    fn test_timer_resets_when_condition_breaks() {
        let mut machine = FocusStateMachine::default();

        machine.update(0.0, &scores(70.0, 0.0));
        machine.update(2.0, &scores(70.0, 0.0));
        assert_eq!(machine.timers().above_drowsy_warning, 2.0);

        machine.update(2.5, &scores(10.0, 0.0));
        assert_eq!(machine.timers().above_drowsy_warning, 0.0);
        assert_eq!(machine.timers().below_drowsy_recovery, 0.5);

        // A fresh run starts from the interval ending at 3.0
        machine.update(3.0, &scores(70.0, 0.0));
        assert_eq!(machine.timers().above_drowsy_warning, 0.5);
        machine.update(5.0, &scores(70.0, 0.0));
        assert_eq!(machine.state(), FocusState::Focused);
        machine.update(5.5, &scores(70.0, 0.0));
        assert_eq!(machine.state(), FocusState::DrowsyWarning);
    }

    #[test]
    fn test_escalates_to_alarm_and_recovers() {
        let mut machine = FocusStateMachine::default();

        machine.update(0.0, &scores(90.0, 0.0));
        let (state, _) = machine.update(3.0, &scores(90.0, 0.0));
        assert_eq!(state, FocusState::DrowsyWarning);

        // Alarm timer has been running since t=0
        let (state, event) = machine.update(3.5, &scores(90.0, 0.0));
        assert_eq!(state, FocusState::DrowsyAlarm);
        assert_eq!(event.map(|e| e.kind), Some(FocusEventKind::EnterDrowsyAlarm));

        // Recovery needs the full grace period at or below 40
        machine.update(4.0, &scores(40.0, 0.0));
        let (state, _) = machine.update(6.0, &scores(40.0, 0.0));
        assert_eq!(state, FocusState::DrowsyAlarm);
        let (state, event) = machine.update(6.5, &scores(40.0, 0.0));
        assert_eq!(state, FocusState::Focused);
        let event = event.unwrap();
        assert_eq!(event.kind, FocusEventKind::EnterFocused);
        assert_eq!(event.from_state, FocusState::DrowsyAlarm);
        assert_eq!(machine.time_in_state(), 0.0);
    }

    #[test]
    fn test_warning_recovers_without_alarm() {
        let mut machine = FocusStateMachine::new(StateParams {
            recovery_grace_duration: 0.0,
            ..Default::default()
        });

        machine.update(0.0, &scores(0.0, 65.0));
        let (state, _) = machine.update(3.0, &scores(0.0, 65.0));
        assert_eq!(state, FocusState::DistractedWarning);

        // Between recovery and warning: hold
        let (state, _) = machine.update(4.0, &scores(0.0, 50.0));
        assert_eq!(state, FocusState::DistractedWarning);

        let (state, event) = machine.update(4.1, &scores(0.0, 30.0));
        assert_eq!(state, FocusState::Focused);
        assert_eq!(event.unwrap().from_state, FocusState::DistractedWarning);
    }

    #[test]
    fn test_drowsiness_wins_ties() {
        let mut machine = FocusStateMachine::default();

        machine.update(0.0, &scores(70.0, 70.0));
        let (state, event) = machine.update(3.0, &scores(70.0, 70.0));

        assert_eq!(state, FocusState::DrowsyWarning);
        assert_eq!(event.unwrap().kind, FocusEventKind::EnterDrowsyWarning);
    }

    #[test]
    fn test_no_cross_branch_jump() {
        let mut machine = FocusStateMachine::default();

        machine.update(0.0, &scores(95.0, 0.0));
        machine.update(3.0, &scores(95.0, 0.0));
        machine.update(3.5, &scores(95.0, 0.0));
        assert_eq!(machine.state(), FocusState::DrowsyAlarm);

        for i in 1..=120 {
            let t = 3.5 + i as f64 * 0.5;
            let (state, event) = machine.update(t, &scores(95.0, 100.0));
            assert_eq!(state, FocusState::DrowsyAlarm);
            assert!(event.is_none());
        }

        // Once drowsiness recovers, the distracted branch is reached via Focused
        let (state, event) = machine.update(64.0, &scores(0.0, 100.0));
        assert_eq!(state, FocusState::DrowsyAlarm);
        assert!(event.is_none());
        let (state, event) = machine.update(66.5, &scores(0.0, 100.0));
        assert_eq!(state, FocusState::Focused);
        assert_eq!(event.unwrap().to_state, FocusState::Focused);

        let (state, _) = machine.update(67.0, &scores(0.0, 100.0));
        assert_eq!(state, FocusState::DistractedWarning);
    }

    #[test]
    fn test_non_monotonic_timestamp_clamps_dt() {
        let mut machine = FocusStateMachine::default();

        machine.update(10.0, &scores(70.0, 0.0));
        machine.update(8.0, &scores(70.0, 0.0));
        assert_eq!(machine.timers().above_drowsy_warning, 0.0);
        assert_eq!(machine.time_in_state(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut machine = FocusStateMachine::default();
        machine.update(0.0, &scores(70.0, 0.0));
        machine.update(3.0, &scores(70.0, 0.0));
        assert_eq!(machine.state(), FocusState::DrowsyWarning);

        machine.reset();
        assert_eq!(machine.state(), FocusState::Focused);
        assert_eq!(*machine.timers(), DwellTimers::default());
    }

    proptest! {
        #[test]
        fn prop_branches_only_meet_at_focused(
            ticks in prop::collection::vec((0.0f64..2.0, 0.0f64..=100.0, 0.0f64..=100.0), 1..300)
        ) {
            let mut machine = FocusStateMachine::new(StateParams::strict());
            let mut t = 0.0;
            let mut previous = machine.state();
            for (dt, drowsiness, distraction) in ticks {
                t += dt;
                let (state, event) = machine.update(t, &scores(drowsiness, distraction));
                prop_assert!(!(previous.is_drowsy() && state.is_distracted()));
                prop_assert!(!(previous.is_distracted() && state.is_drowsy()));
                match event {
                    Some(event) => {
                        prop_assert_eq!(event.from_state, previous);
                        prop_assert_eq!(event.to_state, state);
                        prop_assert_eq!(event.kind.target(), state);
                        prop_assert_eq!(machine.time_in_state(), 0.0);
                    }
                    None => prop_assert_eq!(state, previous),
                }
                previous = state;
            }
        }
    }
}
