use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use serde::Serialize;
use zbus::zvariant::OwnedValue;

use super::MPRIS_BUS_PREFIX;

/// Raw `Metadata` property as pushed by a player, before extraction.
pub type RawMetadata = HashMap<String, OwnedValue>;

/// Unique identifier for a tracked media session: the player's bus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a SessionId from a D-Bus bus name
    pub fn from_bus_name(bus_name: &str) -> Self {
        Self(bus_name.to_string())
    }

    /// Get the D-Bus bus name
    pub fn bus_name(&self) -> &str {
        &self.0
    }

    /// Short player name derived from the bus name.
    ///
    /// `org.mpris.MediaPlayer2.spotify` becomes `spotify`, and instance
    /// suffixes like `firefox.instance_1_42` keep only the first segment.
    pub fn short_name(&self) -> &str {
        let name = self.0.strip_prefix(MPRIS_BUS_PREFIX).unwrap_or(&self.0);
        name.split('.').next().unwrap_or(name)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current playback status of a media player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackStatus {
    /// Player is currently playing
    Playing,

    /// Player is paused
    Paused,

    /// Player is stopped
    Stopped,

    /// Status not read yet, or the player reported something unrecognised
    #[default]
    Unknown,
}

impl From<&str> for PlaybackStatus {
    fn from(status: &str) -> Self {
        match status {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            "Stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }
}

impl From<PlaybackStatus> for &'static str {
    fn from(status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).into())
    }
}

bitflags! {
    /// Control capabilities advertised by a player.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capabilities: u8 {
        /// `CanPlay`
        const CAN_PLAY = 0b0001;
        /// `CanPause`
        const CAN_PAUSE = 0b0010;
        /// `CanGoNext`
        const CAN_GO_NEXT = 0b0100;
        /// `CanGoPrevious`
        const CAN_GO_PREVIOUS = 0b1000;
    }
}

impl Capabilities {
    /// Build the flag set from the four MPRIS boolean properties.
    pub fn from_flags(can_play: bool, can_pause: bool, can_go_next: bool, can_go_previous: bool) -> Self {
        let mut caps = Self::empty();
        caps.set(Self::CAN_PLAY, can_play);
        caps.set(Self::CAN_PAUSE, can_pause);
        caps.set(Self::CAN_GO_NEXT, can_go_next);
        caps.set(Self::CAN_GO_PREVIOUS, can_go_previous);
        caps
    }
}

impl Serialize for Capabilities {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Capabilities", 4)?;
        state.serialize_field("can_play", &self.contains(Self::CAN_PLAY))?;
        state.serialize_field("can_pause", &self.contains(Self::CAN_PAUSE))?;
        state.serialize_field("can_go_next", &self.contains(Self::CAN_GO_NEXT))?;
        state.serialize_field("can_go_previous", &self.contains(Self::CAN_GO_PREVIOUS))?;
        state.end()
    }
}

/// Remote methods of the MPRIS Player interface this crate invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMethod {
    /// `Play`
    Play,
    /// `Pause`
    Pause,
    /// `PlayPause`
    PlayPause,
    /// `Stop`
    Stop,
    /// `Next`
    Next,
    /// `Previous`
    Previous,
}

impl PlayerMethod {
    /// Wire name of the method.
    pub fn member(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::PlayPause => "PlayPause",
            Self::Stop => "Stop",
            Self::Next => "Next",
            Self::Previous => "Previous",
        }
    }
}

impl fmt::Display for PlayerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.member())
    }
}

/// Properties read from a player in one refresh.
#[derive(Debug, Default)]
pub struct PlayerProperties {
    /// `PlaybackStatus`
    pub status: PlaybackStatus,
    /// `Metadata`, unextracted
    pub metadata: RawMetadata,
    /// `CanPlay`/`CanPause`/`CanGoNext`/`CanGoPrevious`
    pub capabilities: Capabilities,
}

/// Inbound control request from the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Play/pause toggle following the quirk-tolerant policy
    Toggle,
    /// Skip forward
    Next,
    /// Skip backward
    Previous,
}

/// Identity of one inserted session: its id plus the registry sequence number
/// assigned at insertion. Messages carrying a stale sequence are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SessionKey {
    pub(crate) id: SessionId,
    pub(crate) seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_status_parses_wire_strings() {
        assert_eq!(PlaybackStatus::from("Playing"), PlaybackStatus::Playing);
        assert_eq!(PlaybackStatus::from("Paused"), PlaybackStatus::Paused);
        assert_eq!(PlaybackStatus::from("Stopped"), PlaybackStatus::Stopped);
        assert_eq!(PlaybackStatus::from("playing"), PlaybackStatus::Unknown);
        assert_eq!(PlaybackStatus::from(""), PlaybackStatus::Unknown);
    }

    #[test]
    fn short_name_strips_prefix_and_instance() {
        let id = SessionId::from_bus_name("org.mpris.MediaPlayer2.firefox.instance_1_42");
        assert_eq!(id.short_name(), "firefox");

        let id = SessionId::from_bus_name("org.mpris.MediaPlayer2.spotify");
        assert_eq!(id.short_name(), "spotify");
    }

    #[test]
    fn capabilities_from_flags() {
        let caps = Capabilities::from_flags(true, false, true, false);
        assert!(caps.contains(Capabilities::CAN_PLAY));
        assert!(!caps.contains(Capabilities::CAN_PAUSE));
        assert!(caps.contains(Capabilities::CAN_GO_NEXT));
        assert!(!caps.contains(Capabilities::CAN_GO_PREVIOUS));
    }
}
