use tracing::info;

use crate::{
    cli::CommandResult,
    config::Config,
    services::mpris::{LogPresenter, MediaService},
};

/// Run the engine with a logging presenter until Ctrl-C.
///
/// # Errors
///
/// Returns CliError if the session bus is unreachable or the signal handler
/// cannot be installed
pub async fn watch(config: &Config) -> CommandResult {
    let service = MediaService::connect(config.media_options(), Box::new(LogPresenter)).await?;
    info!("Watching media players, press Ctrl-C to stop");

    let interrupted = tokio::signal::ctrl_c().await;
    service.shutdown().await;
    interrupted?;

    Ok(String::new())
}
