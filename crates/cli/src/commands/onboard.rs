//! `gemfarm onboard` — First-time setup.

use gemfarm_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🌱 gemfarm — First-Time Setup");
    println!("=============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    let token_path = AppConfig::default().token_file_path();

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set channel.channel_id in {}", config_path.display());
        println!(
            "   2. Put your account token in {} (or export DISCORD_TOKEN)",
            token_path.display()
        );
        println!(
            "   3. Optional: set notify.user_id and put the alert sender token in {} for DM alerts",
            AppConfig::default().notify.token_file_path().display()
        );
        println!("   4. Run: gemfarm doctor, then gemfarm run\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
