use std::path::Path;

use crate::{
    cli::{CliError, CommandResult, ConfigAction},
    config::{Config, ConfigPaths},
};

pub fn execute(action: ConfigAction, config_path: Option<&Path>) -> CommandResult {
    match action {
        ConfigAction::Schema => {
            let schema = schemars::schema_for!(Config);
            serde_json::to_string_pretty(&schema).map_err(|e| CliError::Render(e.to_string()))
        }
        ConfigAction::Default => {
            toml::to_string_pretty(&Config::default()).map_err(|e| CliError::Render(e.to_string()))
        }
        ConfigAction::Path => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => ConfigPaths::main_config()?,
            };
            Ok(path.display().to_string())
        }
    }
}
