//! dockmedia - MPRIS media session aggregator for dock widgets.
//!
//! Follows every media player on the session bus, reduces their state to the
//! one session worth showing, and drives an expand/collapse presentation
//! state machine for the widget that shows it. Control requests from the
//! widget flow back to that player.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dockmedia::{config::Config, services::mpris::{LogPresenter, MediaService}};
//!
//! # async fn run() -> dockmedia::Result<()> {
//! let config = Config::load(None)?;
//! let service = MediaService::connect(config.media_options(), Box::new(LogPresenter)).await?;
//!
//! service.request_toggle()?;
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and validation.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Command-line interface.
pub mod cli;

/// Reactive services for system integration.
pub mod services;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{DockError, Result};
