use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsdigest_core::AppConfig;

mod commands;
mod render;

use commands::SelectionArgs;

#[derive(Parser)]
#[command(name = "newsdigest")]
#[command(author, version, about = "Fetch the latest headlines and summarize them with a local model")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config.toml (defaults to ~/.config/newsdigest/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Session,
    /// Fetch and summarize one selection, then exit
    Fetch {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// List headlines without summarizing them
    Headlines {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging; stdout is reserved for rendered output
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

    match cli.command {
        Some(Commands::Session) | None => commands::session::run(&config).await,
        Some(Commands::Fetch { selection }) => commands::fetch::run(&config, &selection).await,
        Some(Commands::Headlines { selection }) => {
            commands::headlines::run(&config, &selection).await
        }
    }
}
