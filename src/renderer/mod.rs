mod frame;
mod render_buffer;
mod renderer;

pub use frame::*;
pub use render_buffer::*;
pub use renderer::*;

/// Virtual screen size in pixels. Sprites are drawn into a render texture of
/// this size, which an upscale pass then letterboxes onto the window.
pub const SCREEN_WIDTH: f32 = 640.0;
pub const SCREEN_HEIGHT: f32 = 360.0;

const ASPECT: f32 = SCREEN_WIDTH / SCREEN_HEIGHT;
const INITIAL_QUAD_CAP: usize = 1024;
