//! Unit tests for CLI module
//!
//! Tests argument parsing, player matching and formatting.
//! No bus connection or actual command execution.

#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;

use crate::{
    cli::{
        Cli, CliError, Commands, ConfigAction, commands::media::find_player,
        formatting::format_session,
    },
    services::mpris::{Capabilities, PlaybackStatus, SessionId, SessionSnapshot, TrackInfo},
};

fn session(name: &str, identity: &str) -> SessionSnapshot {
    SessionSnapshot {
        id: SessionId::from_bus_name(&format!("org.mpris.MediaPlayer2.{name}")),
        identity: identity.to_string(),
        status: PlaybackStatus::Paused,
        capabilities: Capabilities::all(),
        track: TrackInfo::default(),
        refreshing: false,
        selected: false,
    }
}

fn sessions() -> Vec<SessionSnapshot> {
    vec![
        session("spotify", "Spotify"),
        session("firefox.instance_1_7", "Mozilla Firefox"),
        session("vlc", "VLC media player"),
    ]
}

fn rejected_reason(result: Result<SessionId, CliError>) -> String {
    match result {
        Err(CliError::InvalidArgument { reason, .. }) => reason,
        other => panic!("expected invalid argument, got {other:?}"),
    }
}

#[test]
fn player_matched_by_index() {
    let id = find_player(&sessions(), "2").unwrap();
    assert_eq!(id.bus_name(), "org.mpris.MediaPlayer2.firefox.instance_1_7");
}

#[test]
fn player_index_out_of_range() {
    let reason = rejected_reason(find_player(&sessions(), "4"));
    assert!(reason.contains("1-3"));

    assert!(find_player(&sessions(), "0").is_err());
}

#[test]
fn player_matched_by_identity_or_bus_name() {
    let by_identity = find_player(&sessions(), "mozilla").unwrap();
    assert_eq!(by_identity.short_name(), "firefox");

    let by_bus_name = find_player(&sessions(), "SPOT").unwrap();
    assert_eq!(by_bus_name.short_name(), "spotify");
}

#[test]
fn ambiguous_player_names_are_rejected() {
    let reason = rejected_reason(find_player(&sessions(), "i"));
    assert!(reason.contains("Multiple players"));
    assert!(reason.contains("Spotify"));
}

#[test]
fn unknown_player_is_rejected() {
    let reason = rejected_reason(find_player(&sessions(), "mpv"));
    assert!(reason.contains("mpv"));

    let reason = rejected_reason(find_player(&[], "1"));
    assert!(reason.contains("No media players"));
}

#[test]
fn session_line_shows_identity_track_and_marker() {
    let mut selected = session("spotify", "Spotify");
    selected.selected = true;
    selected.status = PlaybackStatus::Playing;
    selected.track.title = "Song".to_string();

    let line = format_session(1, &selected);
    assert!(line.contains("1. Spotify (active)"));
    assert!(line.contains("Playing"));
    assert!(line.contains("Song - Unknown Artist"));
    assert!(line.contains("org.mpris.MediaPlayer2.spotify"));
}

#[test]
fn cli_parses_commands() {
    let cli = Cli::try_parse_from(["dockmedia", "--config", "/tmp/c.toml", "toggle", "spot"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/c.toml")));
    assert!(matches!(cli.command, Commands::Toggle { player: Some(ref p) } if p == "spot"));

    let cli = Cli::try_parse_from(["dockmedia", "list", "--json"]).unwrap();
    assert!(matches!(cli.command, Commands::List { json: true }));

    let cli = Cli::try_parse_from(["dockmedia", "config", "schema"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Schema
        }
    ));

    let cli = Cli::try_parse_from(["dockmedia", "watch"]).unwrap();
    assert!(cli.command.is_long_running());

    assert!(Cli::try_parse_from(["dockmedia", "seek"]).is_err());
}
