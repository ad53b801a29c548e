//! `gemfarm doctor` — Diagnose setup problems.

use gemfarm_config::{AppConfig, NotifySettings};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 gemfarm Doctor — Setup Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file, using defaults (run `gemfarm onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    match config.require_token() {
        Ok(_) => println!("  ✅ Account token found"),
        Err(e) => {
            println!("  ❌ {e}");
            println!("     Token file: {}", config.token_file_path().display());
            issues += 1;
        }
    }

    match config.require_channel() {
        Ok(id) => println!("  ✅ Channel configured ({id})"),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    match dm_alert_status(&config.notify) {
        DmAlertStatus::Ready => println!("  ✅ DM alerts configured"),
        DmAlertStatus::MissingRecipient => {
            println!("  ⚠️  Notify token set but no notify.user_id");
            issues += 1;
        }
        DmAlertStatus::Off => println!("  ℹ️  DM alerts off (console alerts only)"),
    }

    let overlaps = config.categories.overlapping_pairs();
    if overlaps.is_empty() {
        println!("  ✅ {} gem categories, no overlaps", config.categories.len());
    } else {
        for (a, b) in overlaps {
            println!("  ⚠️  Categories {a} and {b} overlap; {a} wins");
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum DmAlertStatus {
    Ready,
    MissingRecipient,
    Off,
}

fn dm_alert_status(notify: &NotifySettings) -> DmAlertStatus {
    let has_token = notify.token.as_deref().is_some_and(|t| !t.is_empty());
    if notify.dm_enabled() {
        DmAlertStatus::Ready
    } else if has_token {
        DmAlertStatus::MissingRecipient
    } else {
        DmAlertStatus::Off
    }
}
