use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::services::mpris::MediaError;

/// Error types for dockmedia.
///
/// Covers configuration loading and validation plus failures surfaced by the
/// media engine to one-shot commands.
#[derive(Error, Debug)]
pub enum DockError {
    /// Configuration validation error
    #[error("configuration validation failed for '{component}': {details}")]
    ConfigValidation {
        /// Component that failed validation
        component: String,
        /// Validation error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error (for compatibility)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set
    #[error("cannot locate {0}: neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHome(&'static str),

    /// Media engine error
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// A specialized `Result` type for dockmedia operations.
pub type Result<T> = std::result::Result<T, DockError>;

impl DockError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        DockError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Creates a validation error for one config section.
    pub fn validation(component: &str, details: impl Into<String>) -> Self {
        DockError::ConfigValidation {
            component: component.to_string(),
            details: details.into(),
        }
    }
}
