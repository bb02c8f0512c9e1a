//! PIM580 display pack
//!
//! - [`st7789`]: panel controller (reset, init sequence, windowed writes)
//! - [`frame`]: RGB565 frame buffer and `embedded-graphics` draw target
//! - [`pack`]: panel plus backlight, buttons and RGB LED

pub mod frame;
pub mod pack;
pub mod st7789;

pub use frame::{Frame, FrameError};
pub use pack::{Button, Buttons, DisplayPack};
pub use st7789::{DisplayError, PanelState, St7789, Window, WindowError};

/// Panel width in pixels
pub const WIDTH: u16 = 320;

/// Panel height in pixels
pub const HEIGHT: u16 = 240;
