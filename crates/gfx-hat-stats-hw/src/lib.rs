//! GFX HAT Hardware Library
//!
//! Provides hardware access for the Pimoroni GFX HAT add-on board:
//! an ST7567 128x64 LCD over SPI, a CAP1166 capacitive touch controller
//! and an SN3218 six-zone RGB backlight, both on the I2C bus.

pub mod backlight;
pub mod error;
pub mod lcd;
pub mod touch;

pub use backlight::Backlight;
pub use error::{Error, Result};
pub use lcd::{Framebuffer, LcdDevice};
pub use touch::{Button, TouchAction, TouchDevice, TouchEvent};

/// LCD display dimensions
pub const LCD_WIDTH: u32 = 128;
pub const LCD_HEIGHT: u32 = 64;

/// I2C bus shared by the touch and backlight controllers.
pub const I2C_BUS: u8 = 1;
