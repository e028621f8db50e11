use alerting::{AlarmConfig, AlarmGate, AlarmKind};
use focus_state::{FocusEventKind, StateParams};
use monitor::replay::run_session;
use monitor::settings::ENV_PREFIX;
use monitor::{spawn_reader, MonitorError, MonitorSettings, TickInput};
use session::{FocusSession, SessionConfig, SessionError};
use signals::{Measurement, SignalConfig};
use std::collections::HashMap;
use std::io::{Cursor, Write};

fn jsonl(ticks: &[TickInput]) -> Vec<u8> {
    let mut out = Vec::new();
    for tick in ticks {
        serde_json::to_writer(&mut out, tick).unwrap();
        out.push(b'\n');
    }
    out
}

/// Face present for 5s, then gone until 30s, at 2 Hz
fn face_lost_script() -> Vec<TickInput> {
    (0..=60)
        .map(|i| {
            let timestamp = i as f64 * 0.5;
            let measurement = if timestamp <= 5.0 {
                Measurement::face(0.3, 0.3)
            } else {
                Measurement::no_face()
            };
            TickInput {
                timestamp,
                measurement,
            }
        })
        .collect()
}

fn session_with(config: SessionConfig) -> FocusSession {
    FocusSession::new(config, StateParams::default(), SignalConfig::default()).unwrap()
}

#[tokio::test]
async fn test_replay_raises_distraction_alarm() {
    let input = jsonl(&face_lost_script());
    let (rx, reader) = spawn_reader(Cursor::new(input), 8);

    let report = run_session(
        session_with(SessionConfig::default()),
        AlarmGate::default(),
        rx,
    )
    .await
    .unwrap();
    let summary = reader.await.unwrap().unwrap();

    assert_eq!(summary.ticks, 61);
    assert!(!report.target_reached);
    assert_eq!(report.stats.duration_seconds, 30.0);

    let kinds: Vec<_> = report.stats.events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FocusEventKind::EnterDistractedWarning,
            FocusEventKind::EnterDistractedAlarm
        ]
    );
    assert_eq!(report.stats.events[0].timestamp, 16.0);
    assert_eq!(report.stats.events[1].timestamp, 23.0);
    assert_eq!(report.alarms.len(), 1);
    assert_eq!(report.alarms[0].kind, AlarmKind::Distracted);
    assert_eq!(report.alarms[0].timestamp, 23.0);
    assert!((report.stats.focused_seconds - 16.0).abs() < 1e-9);

    let total = report.stats.focused_seconds
        + report.stats.drowsy_seconds
        + report.stats.distracted_seconds;
    assert!((total - 30.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_replay_stops_at_target_duration() {
    let input = jsonl(&face_lost_script());
    let (rx, _reader) = spawn_reader(Cursor::new(input), 2);

    let config = SessionConfig {
        target_duration_seconds: Some(4.0),
        ..Default::default()
    };
    let report = run_session(session_with(config), AlarmGate::default(), rx)
        .await
        .unwrap();

    assert!(report.target_reached);
    assert_eq!(report.stats.duration_seconds, 4.0);
    assert_eq!(report.stats.focused_seconds, 4.0);
    assert!(report.stats.events.is_empty());
}

#[tokio::test]
async fn test_disabled_alarm_still_records_events() {
    let input = jsonl(&face_lost_script());
    let (rx, _reader) = spawn_reader(Cursor::new(input), 8);

    let gate = AlarmGate::new(AlarmConfig {
        distracted_enabled: false,
        ..Default::default()
    });
    let report = run_session(session_with(SessionConfig::default()), gate, rx)
        .await
        .unwrap();

    assert!(report.alarms.is_empty());
    assert_eq!(report.stats.events.len(), 2);
}

#[tokio::test]
async fn test_output_document_from_file_settings() {
    let mut settings_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(settings_file, "sensitivity_profile = \"strict\"").unwrap();
    let env = config::Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()));
    let settings = MonitorSettings::load_with(Some(settings_file.path()), env).unwrap();

    let input = jsonl(&face_lost_script());
    let (rx, _reader) = spawn_reader(Cursor::new(input), 8);
    let report = run_session(
        settings.build_session().unwrap(),
        AlarmGate::new(settings.alarm_config()),
        rx,
    )
    .await
    .unwrap();

    let output = report.to_output(Some("replay".into())).unwrap();
    let json = serde_json::to_value(&output).unwrap();

    assert_eq!(json["session"]["duration_seconds"], 30);
    assert_eq!(json["session"]["notes"], "replay");
    assert_eq!(json["events"][0]["type"], "ENTER_DISTRACTED_WARNING");
    assert_eq!(json["alarms"][0]["kind"], "DISTRACTED");

    let config: serde_json::Value =
        serde_json::from_str(json["session"]["config_json"].as_str().unwrap()).unwrap();
    assert_eq!(config["state_params"]["distracted_warning_threshold"], 50.0);
}

#[tokio::test]
async fn test_far_future_tick_is_reported_not_panicked() {
    let ticks = [0.0, 1.0e13].map(|timestamp| TickInput {
        timestamp,
        measurement: Measurement::no_face(),
    });
    let (rx, _reader) = spawn_reader(Cursor::new(jsonl(&ticks)), 2);

    let report = run_session(
        session_with(SessionConfig::default()),
        AlarmGate::default(),
        rx,
    )
    .await
    .unwrap();
    assert_eq!(report.stats.events.len(), 1);

    let result = report.to_output(None);
    assert!(matches!(
        result,
        Err(MonitorError::Session(SessionError::TimestampOutOfRange(t))) if t == 1.0e13
    ));
}
