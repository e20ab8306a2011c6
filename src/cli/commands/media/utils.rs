use std::time::Duration;

use tokio::time;
use tracing::debug;

use crate::{
    cli::CliError,
    config::Config,
    services::mpris::{
        MediaService, PlaybackStatus, PresentationState, Presenter, SessionId, SessionSnapshot,
        TrackInfo,
    },
};

/// Presenter for one-shot commands, which show nothing.
struct Headless;

impl Presenter for Headless {
    fn on_session_update(&mut self, _track: &TrackInfo, _status: PlaybackStatus) {}

    fn on_presentation_state_change(&mut self, _state: PresentationState, _target_size: u32) {}
}

/// Start the media service and wait for the players to report their state,
/// at most `settle_timeout_ms`.
///
/// # Errors
/// Returns CliError if the session bus is unreachable
pub async fn connect(config: &Config) -> Result<MediaService, CliError> {
    let service = MediaService::connect(config.media_options(), Box::new(Headless)).await?;
    settle(&service, config.media.settle_timeout()).await;
    Ok(service)
}

async fn settle(service: &MediaService, timeout: Duration) {
    if time::timeout(timeout, service.wait_settled()).await.is_err() {
        debug!(timeout_ms = timeout.as_millis(), "Players did not all respond in time");
    }
}

/// Finds a player by identifier (index or partial name match)
///
/// Supports:
/// - Numeric indices (1-based): "1", "2", etc.
/// - Partial name matching against identity or bus name: "spotify", "fire"
/// - Case-insensitive matching
///
/// # Errors
///
/// Returns CliError if no matching player is found or multiple matches exist
pub(crate) fn find_player(
    sessions: &[SessionSnapshot],
    identifier: &str,
) -> Result<SessionId, CliError> {
    if sessions.is_empty() {
        return Err(invalid("No media players found".to_string()));
    }

    if let Ok(index) = identifier.parse::<usize>() {
        return match index.checked_sub(1).and_then(|i| sessions.get(i)) {
            Some(session) => Ok(session.id.clone()),
            None => Err(invalid(format!(
                "Invalid player index. Valid range: 1-{}",
                sessions.len()
            ))),
        };
    }

    let identifier_lower = identifier.to_lowercase();
    let matches: Vec<&SessionSnapshot> = sessions
        .iter()
        .filter(|session| {
            session.identity.to_lowercase().contains(&identifier_lower)
                || session.id.bus_name().to_lowercase().contains(&identifier_lower)
        })
        .collect();

    match matches.as_slice() {
        [] => Err(invalid(format!("No player found matching '{identifier}'"))),
        [session] => Ok(session.id.clone()),
        _ => {
            let names: Vec<&str> = matches.iter().map(|s| s.identity.as_str()).collect();
            Err(invalid(format!(
                "Multiple players match '{identifier}': {}. Please be more specific.",
                names.join(", ")
            )))
        }
    }
}

fn invalid(reason: String) -> CliError {
    CliError::InvalidArgument {
        arg: "player".to_string(),
        reason,
    }
}
