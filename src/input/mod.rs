mod axis;
mod button;
mod input;

pub use axis::*;
pub use button::*;
pub use input::*;
