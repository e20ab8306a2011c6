//! Formatting utilities for CLI output.

use crate::services::mpris::{PlaybackStatus, SessionSnapshot};

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Yellow color
    pub const YELLOW: &'static str = "\x1b[33m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats section headers with styling
pub fn format_header(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str) -> String {
    format!("{}{}{}", Colors::DIM, text, Colors::RESET)
}

/// Formats error messages with styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Colored status label
pub fn format_status(status: PlaybackStatus) -> String {
    let (color, label) = match status {
        PlaybackStatus::Playing => (Colors::GREEN, "▶ Playing"),
        PlaybackStatus::Paused => (Colors::YELLOW, "⏸ Paused"),
        PlaybackStatus::Stopped => (Colors::DIM, "⏹ Stopped"),
        PlaybackStatus::Unknown => (Colors::DIM, "? Unknown"),
    };
    format!("{color}{label}{}", Colors::RESET)
}

/// One entry of the `list` output: index, name, status, then the track.
pub fn format_session(index: usize, session: &SessionSnapshot) -> String {
    let marker = if session.selected { " (active)" } else { "" };
    let refreshing = if session.refreshing {
        format_description(" (no response yet)")
    } else {
        String::new()
    };

    format!(
        "  {index}. {}{marker} {}{refreshing}\n     {} - {}\n     {}",
        session.identity,
        format_status(session.status),
        session.track.title,
        session.track.artist,
        format_description(session.id.bus_name()),
    )
}
