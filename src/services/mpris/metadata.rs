use serde::Serialize;
use zbus::zvariant::Value;

use super::RawMetadata;

const TITLE_KEY: &str = "xesam:title";
const ARTIST_KEY: &str = "xesam:artist";
const ALBUM_KEY: &str = "xesam:album";
const ART_URL_KEY: &str = "mpris:artUrl";
const TRACK_ID_KEY: &str = "mpris:trackid";

/// Title used when the player does not report one.
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Artist used when the player does not report one.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Album used when the player does not report one.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Normalized track descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackInfo {
    /// Track title
    pub title: String,

    /// Track artist(s), joined with ", " when the player sent a list
    pub artist: String,

    /// Album name
    pub album: String,

    /// Artwork URI; absent rather than defaulted so the renderer can fall
    /// back to its own placeholder
    pub art_url: Option<String>,

    /// MPRIS track identifier, empty when not reported
    pub track_id: String,
}

impl Default for TrackInfo {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            art_url: None,
            track_id: String::new(),
        }
    }
}

impl From<&RawMetadata> for TrackInfo {
    fn from(metadata: &RawMetadata) -> Self {
        extract(metadata)
    }
}

/// Normalize a raw `Metadata` dictionary into a [`TrackInfo`].
///
/// Never fails: missing fields and type mismatches fall back to the field
/// default, unknown keys are ignored.
pub fn extract(metadata: &RawMetadata) -> TrackInfo {
    let mut track = TrackInfo::default();

    if let Some(title) = string_field(metadata, TITLE_KEY) {
        track.title = title;
    }

    if let Some(artist) = metadata.get(ARTIST_KEY).and_then(|v| artist_string(v)) {
        track.artist = artist;
    }

    if let Some(album) = string_field(metadata, ALBUM_KEY) {
        track.album = album;
    }

    track.art_url = string_field(metadata, ART_URL_KEY);

    if let Some(track_id) = metadata.get(TRACK_ID_KEY).and_then(|v| as_string(v)) {
        track.track_id = track_id;
    }

    track
}

fn string_field(metadata: &RawMetadata, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(|value| as_string(value))
        .filter(|s| !s.is_empty())
}

fn artist_string(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Array(array) => {
            let artists: Vec<String> = array
                .iter()
                .filter_map(as_string)
                .filter(|s| !s.is_empty())
                .collect();

            if artists.is_empty() {
                None
            } else {
                Some(artists.join(", "))
            }
        }
        Value::Value(inner) => artist_string(inner),
        other => as_string(other).filter(|s| !s.is_empty()),
    }
}

fn as_string(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.as_str().to_string()),
        Value::ObjectPath(path) => Some(path.as_str().to_string()),
        Value::Value(inner) => as_string(inner),
        _ => None,
    }
}
