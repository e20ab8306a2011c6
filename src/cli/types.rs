use thiserror::Error;

use crate::{DockError, services::mpris::MediaError};

/// Errors that can occur during CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    /// An argument did not select anything usable.
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// Argument name
        arg: String,
        /// Why it was rejected
        reason: String,
    },

    /// The media engine failed.
    #[error("{service} service error: {details}")]
    ServiceError {
        /// Service that failed
        service: String,
        /// Failure details
        details: String,
    },

    /// Configuration could not be loaded or rendered.
    #[error(transparent)]
    Config(#[from] DockError),

    /// Serialization of command output failed.
    #[error("Failed to render output: {0}")]
    Render(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<MediaError> for CliError {
    fn from(error: MediaError) -> Self {
        CliError::ServiceError {
            service: "Media".to_string(),
            details: error.to_string(),
        }
    }
}

/// Type alias for command execution results.
///
/// All CLI commands return the text to print on success.
pub type CommandResult = Result<String, CliError>;
