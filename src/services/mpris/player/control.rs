use crate::services::mpris::{Capabilities, PlaybackStatus, PlayerMethod};

/// Choose the method a play/pause toggle should invoke.
///
/// Strict priority chain, first match wins:
/// 1. `CanPlay` and `CanPause`: `PlayPause`.
/// 2. `CanPlay` while `Paused`: `Play`. Some players (Plexamp) drop
///    `CanPause` while paused.
/// 3. `Playing`: `Stop` as a fallback.
/// 4. Otherwise nothing.
pub fn toggle_method(capabilities: Capabilities, status: PlaybackStatus) -> Option<PlayerMethod> {
    let can_play = capabilities.contains(Capabilities::CAN_PLAY);
    let can_pause = capabilities.contains(Capabilities::CAN_PAUSE);

    if can_play && can_pause {
        Some(PlayerMethod::PlayPause)
    } else if can_play && status == PlaybackStatus::Paused {
        Some(PlayerMethod::Play)
    } else if status == PlaybackStatus::Playing {
        Some(PlayerMethod::Stop)
    } else {
        None
    }
}
