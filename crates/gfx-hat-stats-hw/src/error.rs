//! Error types for the GFX HAT hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// I2C bus communication error.
    #[error("I2C error: {0}")]
    I2c(#[from] rppal::i2c::Error),

    /// SPI bus communication error.
    #[error("SPI error: {0}")]
    Spi(#[from] rppal::spi::Error),

    /// GPIO access error.
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    /// Touch controller did not identify as a CAP1166.
    #[error("unexpected touch controller product id: {0:#04X} (expected 0x51)")]
    UnexpectedProductId(u8),

    /// Touch channel outside the six buttons on the board.
    #[error("invalid touch channel: {0}")]
    InvalidChannel(u8),

    /// Backlight zone outside the six zones on the board.
    #[error("invalid backlight zone: {0}")]
    InvalidZone(u8),

    /// Framebuffer size mismatch.
    #[error("framebuffer size mismatch: expected {expected}, got {actual}")]
    FramebufferSize { expected: usize, actual: usize },
}
