//! MPRIS session aggregation.
//!
//! Tracks every media player on the session bus, picks the one worth showing
//! and drives the show/hide state of the widget presenting it.
//!
//! ```rust,no_run
//! use dockmedia::services::mpris::{LogPresenter, MediaOptions, MediaService};
//!
//! # async fn run() -> Result<(), dockmedia::services::mpris::MediaError> {
//! let service = MediaService::connect(MediaOptions::default(), Box::new(LogPresenter)).await?;
//! service.wait_settled().await;
//!
//! if let Some(selection) = service.selection() {
//!     println!("{} - {}", selection.track.artist, selection.track.title);
//! }
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub(crate) mod engine;
/// Media error types
pub mod error;
/// Events broadcast to observers
pub mod events;
/// Track metadata extraction
pub mod metadata;
/// Per-player handle and control policy
pub mod player;
/// Widget visibility state machine
pub mod presentation;
/// D-Bus proxy definitions
pub mod proxy;
/// Tracked session store
pub mod registry;
/// Active session selection policy
pub mod selector;
/// Public service handle and presenter interface
pub mod service;
/// Bus abstraction and its zbus implementation
pub mod transport;
/// Core identifiers and property types
pub mod types;
/// Player presence watching
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use error::MediaError;
pub use events::{MediaEvent, MediaEventSender};
pub use metadata::{TrackInfo, extract};
pub use player::{ControlCall, PlayerHandle, toggle_method};
pub use presentation::{PresentationState, PresentationStateMachine, Transition};
pub use proxy::*;
pub use registry::{MediaSession, SessionRegistry};
pub use selector::{Selection, select, select_from};
pub use service::{LogPresenter, MediaOptions, MediaService, Presenter, SessionSnapshot};
pub use transport::{DbusMediaBus, MediaBus, NameOwnerChange, PlayerConnection, PlayerTransport};
pub(crate) use types::SessionKey;
pub use types::{
    Capabilities, ControlRequest, PlaybackStatus, PlayerMethod, PlayerProperties, RawMetadata,
    SessionId,
};
pub use watcher::{BusEvent, BusWatcher, NameFilter};
