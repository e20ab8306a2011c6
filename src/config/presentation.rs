use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DockError, Result};

/// Widget sizing and animation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PresentationConfig {
    /// Smallest width the expanded widget is given, in pixels.
    pub min_width: u32,

    /// Largest width the expanded widget is given, in pixels.
    pub max_width: u32,

    /// Length of one expand or collapse animation, in milliseconds.
    pub animation_ms: u64,
}

impl PresentationConfig {
    /// Animation length.
    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub(super) fn validate(&self) -> Result<()> {
        if self.min_width > self.max_width {
            return Err(DockError::validation(
                "presentation",
                format!(
                    "min_width ({}) must not exceed max_width ({})",
                    self.min_width, self.max_width
                ),
            ));
        }

        if self.animation_ms == 0 {
            return Err(DockError::validation(
                "presentation",
                "animation_ms must be greater than zero",
            ));
        }

        Ok(())
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            min_width: 180,
            max_width: 300,
            animation_ms: 300,
        }
    }
}
