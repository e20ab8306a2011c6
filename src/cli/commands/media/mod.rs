mod control;
mod list;
mod utils;
mod watch;

pub use control::control;
pub use list::list;
#[cfg(test)]
pub(crate) use utils::find_player;
pub use watch::watch;
