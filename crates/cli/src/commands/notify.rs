//! `gemfarm notify-test` — Fire a test alert through every notifier.

use gemfarm_channels::{DiscordDmNotifier, LogNotifier};
use gemfarm_config::AppConfig;
use gemfarm_core::notify::Notifier;

const TEST_ALERT: &str = "gemfarm test alert: notifications are working.";

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🔔 Sending test alert");

    // The DM path is exercised directly so delivery errors surface here
    match DiscordDmNotifier::from_app_config(&config) {
        Some(Ok(dm)) => match dm.send(TEST_ALERT).await {
            Ok(()) => println!("   ✅ DM delivered"),
            Err(e) => {
                println!("   ❌ DM failed: {e}");
                return Err(e.into());
            }
        },
        Some(Err(e)) => {
            println!("   ❌ DM notifier misconfigured: {e}");
            return Err(e.into());
        }
        None => println!("   ℹ️  DM alerts off (set notify.user_id plus notify.token or its token file)"),
    }

    LogNotifier.alert(TEST_ALERT).await;
    println!("   ✅ Console alert written");

    Ok(())
}
