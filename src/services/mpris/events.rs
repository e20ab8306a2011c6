use tokio::sync::broadcast;

use super::{PlaybackStatus, PresentationState, Selection, SessionId, TrackInfo};

/// Broadcast sender for [`MediaEvent`]s.
pub type MediaEventSender = broadcast::Sender<MediaEvent>;

/// Events emitted by the media engine
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// A player service appeared and is now tracked
    SessionAdded(SessionId),

    /// A player service disappeared and is no longer tracked
    SessionRemoved(SessionId),

    /// A tracked session's properties were refreshed
    SessionUpdated {
        /// Session that changed
        id: SessionId,
        /// Status after the refresh
        status: PlaybackStatus,
        /// Track after the refresh
        track: TrackInfo,
    },

    /// The presented session changed (`None` when nothing is playing)
    SelectionChanged(Option<Selection>),

    /// The presentation state machine started or finished a transition
    PresentationChanged {
        /// New state
        state: PresentationState,
        /// Size the widget animates towards
        target_size: u32,
    },

    /// Non-fatal failure (transport error, rejected control call)
    Diagnostic(String),
}
