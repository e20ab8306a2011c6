/// Play/pause toggle policy
pub mod control;
/// Per-player cached state and control dispatch
pub mod handle;
/// Per-player property monitoring task
pub(crate) mod monitoring;

pub use control::toggle_method;
pub use handle::{ControlCall, PlayerHandle};
