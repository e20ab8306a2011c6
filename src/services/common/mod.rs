//! Common utilities and abstractions for services

/// Watch-backed observable values
pub mod property;

pub use property::Property;
