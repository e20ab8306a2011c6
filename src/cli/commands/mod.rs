mod config;
pub(crate) mod media;

use std::path::Path;

use super::{Commands, CommandResult};
use crate::{config::Config, services::mpris::ControlRequest};

/// Run `command` and return what to print.
///
/// # Errors
/// Returns CliError if the media service fails, the player selector matches
/// nothing usable, or configuration output cannot be rendered
pub async fn execute(
    command: &Commands,
    config: &Config,
    config_path: Option<&Path>,
) -> CommandResult {
    match command {
        Commands::Watch => media::watch(config).await,
        Commands::List { json } => media::list(config, *json).await,
        Commands::Toggle { player } => {
            media::control(config, player.as_deref(), ControlRequest::Toggle).await
        }
        Commands::Next { player } => {
            media::control(config, player.as_deref(), ControlRequest::Next).await
        }
        Commands::Previous { player } => {
            media::control(config, player.as_deref(), ControlRequest::Previous).await
        }
        Commands::Config { action } => config::execute(*action, config_path),
    }
}
