use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use summarize_shortcut_core::{AppConfig, FileSettingsStore, ProviderRegistry};

mod commands;

#[derive(Parser)]
#[command(name = "summarize-shortcut")]
#[command(author, version, about = "Summarize selected text with an LLM provider")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the summarize command on a selection
    Summarize {
        /// Selected text (read from stdin when omitted)
        #[arg(short = 't', long)]
        text: Option<String>,
        /// Print the overlay markup instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Show or change provider settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Check the selected provider's credentials
    Verify,
    /// List Gemini models that can generate summaries
    Models {
        /// Gemini API key (defaults to the stored one)
        #[arg(long)]
        api_key: Option<String>,
        /// Store the list in the settings
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the stored settings with keys hidden
    Show,
    /// Set a settings key (empty value clears it)
    Set {
        key: String,
        value: String,
    },
    /// Verify a provider's credentials and make it the selected one
    Select {
        /// openai, azure or gemini
        provider: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; stdout carries command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let store = FileSettingsStore::new(config.settings_path());
    let registry = ProviderRegistry::new(&config)?;

    match cli.command {
        Commands::Summarize { text, html } => {
            commands::summarize::run(&config, store, registry, text, html).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&store).await,
            ConfigAction::Set { key, value } => commands::config::set(&store, &key, &value).await,
            ConfigAction::Select { provider } => {
                commands::config::select(&store, &registry, &provider).await
            }
        },
        Commands::Verify => commands::verify::run(&store, &registry).await,
        Commands::Models { api_key, save } => {
            commands::models::run(&store, &registry, api_key, save).await
        }
    }
}
