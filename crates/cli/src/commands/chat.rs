//! `relaybot chat`: Interactive or single-message chat mode.

use std::io::Write;

use relaybot_config::AppConfig;
use relaybot_core::message::ConversationSession;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

/// `exit`, `quit` or `bye`, in any case.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_WORDS.iter().any(|word| line.eq_ignore_ascii_case(word))
}

pub async fn run(
    profile: Option<String>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    // Check for API key early: give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    RELAYBOT_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!("  as `api_key`, or under [providers.{}].", config.default_provider);
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let profile = super::load_profile(&config, profile.as_deref())?;
    let kind = profile.kind;

    let providers = relaybot_providers::router::build_from_config(&config);
    let provider = providers.default().ok_or("No default provider configured")?;
    let assistant = super::build_assistant(&config, profile, provider);
    let mut session = ConversationSession::new();

    if let Some(msg) = message {
        // Single message mode
        let exchange = assistant.respond(&mut session, &msg).await;
        println!("{}", exchange.reply);
        return match exchange.error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        };
    }

    // Interactive mode
    println!();
    println!("  {}", kind.title());
    println!("  {}", kind.description());
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Actions:   {}", assistant.router().registry().names().join(", "));
    println!();
    println!("  Examples:");
    for example in kind.examples() {
        println!("    - '{example}'");
    }
    println!();
    println!("  Type 'exit' to quit.");
    println!("{}", "=".repeat(50));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("User:> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!("\n\nExiting chat...");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit_command(line) {
            println!("\n\n{}", kind.farewell());
            break;
        }

        let exchange = assistant.respond(&mut session, line).await;
        debug!(
            matched = ?exchange.decision.matched().map(|(action, _)| action),
            turns_dropped = exchange.prompt.turns_dropped,
            "Exchange complete"
        );
        println!("{}:> {}", kind.bot_name(), exchange.reply);
    }

    Ok(())
}
