//! CAP1166 capacitive touch controller driver.

pub mod device;

pub use device::{Button, TouchAction, TouchDevice, TouchEvent};
