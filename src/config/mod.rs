//! Configuration schema definitions and validation.
//!
//! Defines the configuration structure for dockmedia: general settings,
//! player tracking and widget presentation. All configurations are
//! serializable to/from TOML format and every field has a default.

mod general;
mod loading;
mod media;
mod paths;
mod presentation;

pub use general::{GeneralConfig, LogLevel};
pub use media::MediaConfig;
pub use paths::ConfigPaths;
pub use presentation::PresentationConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::services::mpris::MediaOptions;

/// Main configuration structure for dockmedia.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Player discovery and tracking.
    #[serde(default)]
    pub media: MediaConfig,

    /// Widget sizing and animation.
    #[serde(default)]
    pub presentation: PresentationConfig,
}

impl Config {
    /// Engine options derived from this configuration.
    pub fn media_options(&self) -> MediaOptions {
        MediaOptions {
            ignored_players: self.media.ignored_players.clone(),
            enumeration_retry: self.media.enumeration_retry(),
            animation: self.presentation.animation(),
            min_width: self.presentation.min_width,
            max_width: self.presentation.max_width,
        }
    }
}

#[cfg(test)]
mod tests;
