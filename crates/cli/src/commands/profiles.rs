//! `relaybot profiles`: List the built-in assistant profiles.

use relaybot_agent::ProfileKind;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    println!("Available profiles:");
    println!();
    for kind in ProfileKind::ALL {
        let marker = if kind.as_str() == config.default_profile { "*" } else { " " };
        let options = kind.options();
        println!(
            "  {marker} {:<12} {} (temperature {}, max {} tokens)",
            kind.as_str(),
            kind.description(),
            options.temperature,
            options.max_tokens
        );
    }
    println!();
    println!("  * default. Choose another with --profile or RELAYBOT_PROFILE.");
    Ok(())
}
