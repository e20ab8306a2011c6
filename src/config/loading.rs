use std::{fs, path::Path};

use tracing::{debug, instrument};

use super::{Config, ConfigPaths};
use crate::{DockError, Result};

impl Config {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if a file is there, otherwise every setting takes its default.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid TOML, or fails
    /// validation
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let default_path = ConfigPaths::main_config()?;
        if default_path.exists() {
            Self::load_from(&default_path)
        } else {
            debug!(path = %default_path.display(), "No config file, using defaults");
            Ok(Config::default())
        }
    }

    /// Load and validate the configuration file at `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid TOML, or fails
    /// validation
    pub fn load_from(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| DockError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| DockError::toml_parse(e, Some(path)))?;
        config.validate()?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or fails validation
    pub fn from_toml_str(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).map_err(|e| DockError::toml_parse(e, None))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns `DockError::ConfigValidation` naming the offending section
    pub fn validate(&self) -> Result<()> {
        self.media.validate()?;
        self.presentation.validate()
    }
}
