//! ST7567 LCD driver: framebuffer, wire protocol, and SPI device.

pub mod device;
pub mod framebuffer;
pub mod protocol;

pub use device::LcdDevice;
pub use framebuffer::Framebuffer;
