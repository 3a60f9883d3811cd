//! Chess Session - console front end
//!
//! Play a game against the computer from the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use chess_session::{SessionConfig, run_console};
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            color,
            seed,
        } => run_play(&config, color, seed).await,
        Command::ShowConfig { config } => show_config(&config),
    }
}

/// Run an interactive game
#[instrument(skip_all, fields(config_path = %config_path.display()))]
async fn run_play(
    config_path: &Path,
    color: Option<chess_session::HumanSide>,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = SessionConfig::load_or_default(config_path)?;
    if let Some(color) = color {
        config = config.with_human_side(color);
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    initialize_tracing(&config);
    info!(human_side = ?config.human_side(), seed = ?config.seed(), "Starting console session");

    run_console(&config).await
}

/// Print the effective configuration
fn show_config(config_path: &Path) -> Result<()> {
    let config = SessionConfig::load_or_default(config_path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn initialize_tracing(config: &SessionConfig) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.effective_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Tracing initialized");
}
