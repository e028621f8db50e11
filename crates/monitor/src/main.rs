//! Focus Monitor - replays per-tick face measurements through a session

use anyhow::Context;
use clap::Parser;
use monitor::{init_logging, replay, spawn_reader, MonitorSettings};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "focus-monitor", about = "Attentiveness monitor for focus sessions")]
struct Cli {
    /// JSON Lines measurement file (stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Settings file (TOML or JSON)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Sensitivity profile, overrides the settings file
    #[arg(long)]
    profile: Option<String>,

    /// Free-form notes stored with the session record
    #[arg(long)]
    notes: Option<String>,

    /// Measurements buffered between reader and session loop
    #[arg(long, default_value_t = 256)]
    channel_capacity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings =
        MonitorSettings::load(cli.settings.as_deref()).context("failed to load settings")?;
    if let Some(profile) = cli.profile {
        settings.sensitivity_profile = profile;
    }

    init_logging(settings.log_format)?;
    info!("focus-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    info!("profile: {}", settings.profile());

    let session = settings
        .build_session()
        .context("invalid session configuration")?;
    let gate = alerting::AlarmGate::new(settings.alarm_config());

    let (rx, reader) = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            spawn_reader(BufReader::new(file), cli.channel_capacity)
        }
        _ => spawn_reader(BufReader::new(tokio::io::stdin()), cli.channel_capacity),
    };

    let report = replay::run_session(session, gate, rx)
        .await
        .context("replay failed")?;
    if report.target_reached {
        // Remaining input is not needed; stdin may never reach EOF
        reader.abort();
    } else {
        let summary = reader
            .await
            .context("reader task panicked")?
            .context("failed to read measurements")?;
        info!(
            "read {} measurements ({} skipped)",
            summary.ticks, summary.skipped
        );
    }

    let output = report.to_output(cli.notes)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
