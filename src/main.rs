//! dockmedia entry point.

use std::{error::Error, process};

use clap::Parser;
use dockmedia::{
    cli::{self, Cli, formatting::format_error},
    config::Config,
    tracing_config,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    };

    let _guard = if cli.command.is_long_running() {
        let guard = tracing_config::init_with_file(config.general.log_level)?;
        info!("Starting dockmedia");
        Some(guard)
    } else {
        tracing_config::init(config.general.log_level)?;
        None
    };

    match cli::execute(&cli.command, &config, cli.config.as_deref()).await {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    }
}
