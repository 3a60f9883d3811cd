//! Command-line interface for chess_session.

use chess_session::HumanSide;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chess Session - play chess against the computer in the terminal
#[derive(Parser, Debug)]
#[command(name = "chess_session")]
#[command(about = "Play chess against a computer opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game on the console
    Play {
        /// Path to session config (defaults are used if the file is missing)
        #[arg(short, long, default_value = "chess_session.toml")]
        config: PathBuf,

        /// Side to play: white, black or random
        #[arg(long)]
        color: Option<HumanSide>,

        /// Seed for reproducible computer moves
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the effective configuration as TOML
    ShowConfig {
        /// Path to session config
        #[arg(short, long, default_value = "chess_session.toml")]
        config: PathBuf,
    },
}
