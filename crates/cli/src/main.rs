//! Relaybot CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Write a default config file
//! - `chat`: Interactive console or single-message mode
//! - `route`: Dry-run routing for one utterance
//! - `actions`: List a profile's actions and parameters
//! - `profiles`: List the built-in assistant profiles

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "relaybot",
    about = "Relaybot — rule-routed conversational assistants",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with an assistant
    Chat {
        /// Profile to use (defaults to `default_profile` from config)
        #[arg(short, long, env = "RELAYBOT_PROFILE")]
        profile: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show how an utterance would be routed, without calling anything
    Route {
        /// Profile to route against
        #[arg(short, long, env = "RELAYBOT_PROFILE")]
        profile: Option<String>,

        /// The utterance
        text: String,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the actions a profile can invoke
    Actions {
        /// Profile to inspect
        #[arg(short, long, env = "RELAYBOT_PROFILE")]
        profile: Option<String>,

        /// Print definitions with parameter schemas as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in profiles
    Profiles,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { profile, message } => commands::chat::run(profile, message).await?,
        Commands::Route {
            profile,
            text,
            json,
        } => commands::route::run(profile, &text, json)?,
        Commands::Actions { profile, json } => commands::actions::run(profile, json)?,
        Commands::Profiles => commands::profiles::run()?,
    }

    Ok(())
}
