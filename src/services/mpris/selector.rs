use std::cmp::{Ordering, Reverse};

use serde::Serialize;

use super::{MediaSession, PlaybackStatus, SessionId, SessionRegistry, TrackInfo};

/// The session chosen for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Selected session
    pub id: SessionId,
    /// Its current track
    pub track: TrackInfo,
    /// Its current status (always `Playing` when produced by [`select`])
    pub status: PlaybackStatus,
}

/// Pick the session to present.
///
/// Among `Playing` sessions, the one whose status changed most recently wins;
/// equal timestamps go to the earliest-registered session. With nothing
/// playing the selection is empty, which tells the presentation to collapse.
pub fn select(registry: &SessionRegistry) -> Option<Selection> {
    select_from(registry.sessions())
}

/// [`select`] over any set of sessions.
pub fn select_from<'a>(sessions: impl IntoIterator<Item = &'a MediaSession>) -> Option<Selection> {
    sessions
        .into_iter()
        .filter(|session| session.status() == PlaybackStatus::Playing)
        .max_by(|a, b| rank(a, b))
        .map(|session| Selection {
            id: session.id().clone(),
            track: session.track().clone(),
            status: session.status(),
        })
}

fn rank(a: &MediaSession, b: &MediaSession) -> Ordering {
    (a.last_status_change_at(), Reverse(a.seq())).cmp(&(b.last_status_change_at(), Reverse(b.seq())))
}
