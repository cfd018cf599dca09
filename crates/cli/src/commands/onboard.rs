//! `relaybot onboard`: First-time setup.

use relaybot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Relaybot: First-Time Setup");
    println!("==========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\nConfig already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Add your model API key (api_key, or RELAYBOT_API_KEY / OPENAI_API_KEY)");
    println!("   2. Optionally add action keys under [actions]:");
    println!("      news_api_key, open_weather_map_api_key, tmdb_api_key");
    println!("   3. Run: relaybot chat --profile temperature\n");

    Ok(())
}
