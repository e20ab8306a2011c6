use crate::{
    cli::{CliError, CommandResult},
    config::Config,
    services::mpris::{ControlRequest, MediaService, SessionId, SessionSnapshot},
};

use super::utils::{connect, find_player};

/// Apply `request` to the player matching `player`, or to the active one.
///
/// # Errors
///
/// Returns CliError if no player matches, nothing is playing and no player
/// was named, or the player rejected the call
pub async fn control(config: &Config, player: Option<&str>, request: ControlRequest) -> CommandResult {
    let service = connect(config).await?;
    let result = dispatch(&service, player, request).await;
    service.shutdown().await;
    result
}

async fn dispatch(
    service: &MediaService,
    player: Option<&str>,
    request: ControlRequest,
) -> CommandResult {
    let sessions = service.sessions().await?;
    let target = resolve(&sessions, player)?;
    let name = sessions
        .iter()
        .find(|session| session.id == target)
        .map_or_else(|| target.to_string(), |session| session.identity.clone());

    let output = match service.control(Some(target), request).await? {
        Some(method) => format!("{name}: {method}"),
        None => match request {
            ControlRequest::Toggle => format!("{name} offers nothing to toggle"),
            ControlRequest::Next => format!("{name} cannot skip forward"),
            ControlRequest::Previous => format!("{name} cannot skip backward"),
        },
    };

    Ok(output)
}

fn resolve(sessions: &[SessionSnapshot], player: Option<&str>) -> Result<SessionId, CliError> {
    if let Some(identifier) = player {
        return find_player(sessions, identifier);
    }

    sessions
        .iter()
        .find(|session| session.selected)
        .map(|session| session.id.clone())
        .ok_or_else(|| CliError::InvalidArgument {
            arg: "player".to_string(),
            reason: "Nothing is playing; name a player to control".to_string(),
        })
}
