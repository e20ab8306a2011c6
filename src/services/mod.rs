/// Shared service building blocks
pub mod common;
/// MPRIS media session aggregation
pub mod mpris;

pub use mpris::{MediaEvent, MediaService, Presenter};
