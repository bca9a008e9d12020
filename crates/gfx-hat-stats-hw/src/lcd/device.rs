//! LCD device communication over SPI.

use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use super::framebuffer::{Framebuffer, PAGE_COUNT};
use super::protocol::{contrast_command, init_sequence, page_address};
use crate::Result;

/// BCM pin driving the data/command line.
const PIN_DC: u8 = 6;
/// BCM pin driving the controller reset line.
const PIN_RESET: u8 = 5;
/// SPI clock rate. The ST7567 is specified well above this; 1 MHz keeps
/// the full-frame refresh comfortably under 10 ms.
const SPI_CLOCK_HZ: u32 = 1_000_000;

/// Default electronic volume after power-up.
pub const DEFAULT_CONTRAST: u8 = 40;

/// LCD device controller.
pub struct LcdDevice {
    spi: Spi,
    dc: OutputPin,
    reset: OutputPin,
}

impl LcdDevice {
    /// Opens the LCD on SPI0 CE0 and runs the power-up sequence.
    pub fn open() -> Result<Self> {
        Self::open_with_contrast(DEFAULT_CONTRAST)
    }

    /// Opens the LCD with an explicit initial contrast.
    pub fn open_with_contrast(contrast: u8) -> Result<Self> {
        let gpio = Gpio::new()?;
        let dc = gpio.get(PIN_DC)?.into_output();
        let reset = gpio.get(PIN_RESET)?.into_output();
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)?;

        let mut lcd = Self { spi, dc, reset };
        lcd.hard_reset();
        lcd.command(&init_sequence(contrast))?;
        lcd.blank()?;

        info!("LCD opened (SPI0 CE0, dc=BCM{}, reset=BCM{})", PIN_DC, PIN_RESET);
        Ok(lcd)
    }

    /// Pulses the reset line and waits for the controller to come up.
    fn hard_reset(&mut self) {
        self.reset.set_low();
        thread::sleep(Duration::from_millis(10));
        self.reset.set_high();
        thread::sleep(Duration::from_millis(100));
    }

    fn command(&mut self, bytes: &[u8]) -> Result<()> {
        self.dc.set_low();
        self.spi.write(bytes)?;
        Ok(())
    }

    fn data(&mut self, bytes: &[u8]) -> Result<()> {
        self.dc.set_high();
        self.spi.write(bytes)?;
        Ok(())
    }

    /// Updates the display contrast.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<()> {
        self.command(&contrast_command(contrast))?;
        debug!("LCD contrast set to {}", contrast);
        Ok(())
    }

    /// Writes a full framebuffer to the display, page by page.
    pub fn show(&mut self, fb: &Framebuffer) -> Result<()> {
        for page in 0..PAGE_COUNT {
            self.command(&page_address(page as u8))?;
            self.data(fb.page(page))?;
        }
        Ok(())
    }

    /// Blanks the display.
    pub fn blank(&mut self) -> Result<()> {
        self.show(&Framebuffer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardware tests are skipped by default
    #[test]
    #[ignore]
    fn test_device_open() {
        let device = LcdDevice::open();
        assert!(device.is_ok());
    }
}
