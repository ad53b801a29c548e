//! `gemfarm config` — Configuration management commands.

use gemfarm_config::AppConfig;

const REDACTED: &str = "[REDACTED]";

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            if config.require_token().is_err() {
                warnings.push("No account token (token, token file, or DISCORD_TOKEN)".to_string());
            }
            if config.require_channel().is_err() {
                warnings.push("No channel id (channel.channel_id or GEMFARM_CHANNEL_ID)".to_string());
            }
            for (a, b) in config.categories.overlapping_pairs() {
                warnings.push(format!("Categories {a} and {b} overlap"));
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            let schedule = &config.schedule;
            println!();
            println!("   Commands:   {}", config.commands.farming.join(", "));
            println!("   Categories: {}", config.categories.len());
            println!(
                "   Delay:      {}-{}s per iteration",
                schedule.iteration_delay.min_secs, schedule.iteration_delay.max_secs
            );
            println!(
                "   Breaks:     short every {} msgs, long every {} cycles of {}",
                schedule.short_break_after_messages,
                schedule.long_break_after_cycles,
                schedule.actions_per_cycle
            );
            println!("   Gem check:  every {} iterations", schedule.resource_check_every);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&redacted(config))?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

fn redacted(mut config: AppConfig) -> AppConfig {
    if config.token.is_some() {
        config.token = Some(REDACTED.into());
    }
    if config.notify.token.is_some() {
        config.notify.token = Some(REDACTED.into());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains("config.toml"));
    }

    #[test]
    fn show_never_prints_secrets() {
        let mut config = AppConfig::default();
        config.token = Some("account-secret".into());
        config.notify.token = Some("bot-secret".into());

        let out = toml::to_string_pretty(&redacted(config)).unwrap();
        assert!(!out.contains("account-secret"));
        assert!(!out.contains("bot-secret"));
        assert!(out.contains(REDACTED));
    }
}
