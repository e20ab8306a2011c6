use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DockError, Result};

/// Media service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MediaConfig {
    /// Bus name substrings of players that are never tracked
    pub ignored_players: Vec<String>,

    /// Milliseconds to wait before retrying a failed player enumeration.
    pub enumeration_retry_ms: u64,

    /// Milliseconds one-shot commands wait for players to report their state.
    pub settle_timeout_ms: u64,
}

impl MediaConfig {
    /// Enumeration retry delay.
    pub fn enumeration_retry(&self) -> Duration {
        Duration::from_millis(self.enumeration_retry_ms)
    }

    /// Settle timeout for one-shot commands.
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.enumeration_retry_ms == 0 {
            return Err(DockError::validation(
                "media",
                "enumeration_retry_ms must be greater than zero",
            ));
        }

        Ok(())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ignored_players: Vec::new(),
            enumeration_retry_ms: 2000,
            settle_timeout_ms: 1500,
        }
    }
}
