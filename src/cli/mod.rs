//! Command-line interface.
//!
//! `watch` runs the engine until interrupted; every other command starts it,
//! waits for the players to report in, acts once and shuts it down again.

mod commands;
pub mod formatting;
mod types;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::execute;
pub use types::{CliError, CommandResult};

/// Media session aggregator for MPRIS players.
#[derive(Debug, Parser)]
#[command(name = "dockmedia", version, about)]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Follow players and log what would be shown until Ctrl-C
    Watch,

    /// List tracked players
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Toggle playback on the active player or PLAYER
    Toggle {
        /// 1-based index or part of the player's name
        player: Option<String>,
    },

    /// Skip to the next track
    Next {
        /// 1-based index or part of the player's name
        player: Option<String>,
    },

    /// Skip to the previous track
    Previous {
        /// 1-based index or part of the player's name
        player: Option<String>,
    },

    /// Inspect configuration
    Config {
        /// What to print
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the JSON schema of the configuration file
    Schema,
    /// Print the default configuration as TOML
    Default,
    /// Print the configuration file path in use
    Path,
}

impl Commands {
    /// Whether this command runs until interrupted.
    pub fn is_long_running(&self) -> bool {
        matches!(self, Self::Watch)
    }
}

#[cfg(test)]
mod tests;
