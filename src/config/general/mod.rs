mod log_level;

pub use log_level::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// General configuration settings.
///
/// Contains settings that affect the whole application, such as logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct GeneralConfig {
    /// Logging level, overridden by `RUST_LOG` when that is set.
    #[serde(default)]
    pub log_level: LogLevel,
}
