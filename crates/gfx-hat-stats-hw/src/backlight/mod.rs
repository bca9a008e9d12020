//! SN3218 RGB backlight driver.

pub mod device;

pub use device::Backlight;
