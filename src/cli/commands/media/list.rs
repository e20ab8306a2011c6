use crate::{
    cli::{
        CliError, CommandResult,
        formatting::{format_header, format_session},
    },
    config::Config,
};

use super::utils::connect;

/// List every tracked player with its state.
///
/// # Errors
///
/// Returns CliError if media service initialization fails
pub async fn list(config: &Config, json: bool) -> CommandResult {
    let service = connect(config).await?;
    let sessions = service.sessions().await;
    service.shutdown().await;
    let sessions = sessions?;

    if json {
        return serde_json::to_string_pretty(&sessions).map_err(|e| CliError::Render(e.to_string()));
    }

    if sessions.is_empty() {
        return Ok("No media players found".to_string());
    }

    let mut output = format_header(&format!("Found {} media player(s):", sessions.len()));
    for (index, session) in sessions.iter().enumerate() {
        output.push_str("\n\n");
        output.push_str(&format_session(index + 1, session));
    }

    Ok(output)
}
