use super::{PlayerMethod, SessionId};

/// Errors that can occur during media operations
///
/// None of these are fatal to the engine: they are logged and forwarded to
/// observers as [`MediaEvent::Diagnostic`](super::MediaEvent::Diagnostic).
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    /// Player with the given ID was not found
    #[error("Player {0} not found")]
    PlayerNotFound(SessionId),

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// D-Bus daemon (org.freedesktop.DBus) call failed
    #[error("D-Bus daemon call failed: {0}")]
    FdoError(#[from] zbus::fdo::Error),

    /// Listing the registered bus names failed
    #[error("Failed to enumerate bus names: {0}")]
    EnumerationFailed(String),

    /// Failed to initialize the media service
    #[error("Failed to initialize media service: {0}")]
    InitializationFailed(String),

    /// A remote control call was rejected or could not be delivered
    #[error("Player {player} failed to {method}: {reason}")]
    ControlFailed {
        /// Player the call was sent to
        player: SessionId,
        /// Method that failed
        method: PlayerMethod,
        /// Transport-level reason
        reason: String,
    },

    /// The engine task is no longer running
    #[error("Media engine is not running")]
    EngineStopped,
}
