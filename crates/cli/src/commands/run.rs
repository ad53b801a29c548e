//! `gemfarm run` — Start the farm loop.

use gemfarm_channels::{CompositeNotifier, DiscordConfig, DiscordGateway};
use gemfarm_config::AppConfig;
use gemfarm_core::event::{EventBus, FarmEvent};
use gemfarm_farm::{FarmLoop, human_duration};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub async fn run(max_runtime_minutes: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if max_runtime_minutes.is_some() {
        config.runtime.max_runtime_minutes = max_runtime_minutes;
    }

    // Startup-fatal: no token or channel means nothing to do
    let discord = DiscordConfig::from_app_config(&config).map_err(|e| {
        eprintln!("❌ {e}");
        eprintln!(
            "   Token file: {}",
            config.token_file_path().display()
        );
        e
    })?;

    let gateway = Arc::new(DiscordGateway::new(discord)?);
    let notifier = Arc::new(CompositeNotifier::from_app_config(&config));
    let events = Arc::new(EventBus::default());

    println!("🌱 gemfarm — starting farm loop");
    println!("   Channel:   {}", config.channel.channel_id);
    println!("   Commands:  {}", config.commands.farming.join(", "));
    println!("   Notifiers: {}", notifier.names().join(", "));
    match config.runtime.max_runtime_minutes {
        Some(mins) => println!("   Runtime:   {mins} min"),
        None => println!("   Runtime:   unbounded (Ctrl+C to stop)"),
    }
    println!();

    let event_log = tokio::spawn(log_events(events.subscribe()));

    let mut farm = FarmLoop::new(&config, gateway, notifier, events)?;
    let summary = tokio::select! {
        summary = farm.run() => Some(summary),
        _ = tokio::signal::ctrl_c() => None,
    };
    event_log.abort();

    match summary {
        Some(summary) => {
            println!();
            println!("✅ Finished after {}", human_duration(summary.elapsed));
            println!("   Iterations: {}", summary.iterations);
            println!("   Challenges: {}", summary.challenges);
            println!("   Gem uses:   {}", summary.consumes);
        }
        None => {
            println!();
            println!("🛑 Interrupted after {} iteration(s)", farm.iterations());
        }
    }

    Ok(())
}

/// Mirror farm events into the log with wall-clock times.
async fn log_events(mut rx: broadcast::Receiver<Arc<FarmEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.as_ref() {
                FarmEvent::ChallengeDetected { timestamp } => {
                    warn!(at = %timestamp.format("%H:%M:%S"), "Challenge pause started");
                }
                FarmEvent::ChallengeResolved {
                    timed_out,
                    waited_secs,
                    timestamp,
                } => {
                    info!(
                        at = %timestamp.format("%H:%M:%S"),
                        timed_out,
                        waited = %human_duration(Duration::from_secs(*waited_secs)),
                        "Challenge pause ended"
                    );
                }
                FarmEvent::ResourcesConsumed {
                    ids, timestamp, ..
                } => {
                    info!(at = %timestamp.format("%H:%M:%S"), count = ids.len(), "Gems used");
                }
                FarmEvent::BreakScheduled {
                    kind,
                    secs,
                    timestamp,
                } => {
                    let resume = *timestamp + chrono::Duration::seconds(*secs as i64);
                    info!(
                        kind = ?kind,
                        resume_at = %resume.with_timezone(&chrono::Local).format("%H:%M:%S"),
                        "Break scheduled"
                    );
                }
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "Event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
