mod context;
mod fs_switch;
mod game;
mod time;

pub use context::*;
pub use fs_switch::*;
pub use game::*;
pub use time::*;
