//! Backlight communication via I2C.
//!
//! The backlight is six RGB zones behind the LCD, driven by an SN3218
//! eighteen-channel PWM LED controller. Zone LEDs are wired B,G,R on the
//! board, so a lookup table translates zone colors to channel indices.

use rppal::i2c::I2c;
use tracing::{debug, info};

use crate::{Error, Result};

/// I2C address of the SN3218.
pub const I2C_ADDR: u16 = 0x54;

/// Number of backlight zones.
pub const ZONES: usize = 6;

/// Output enable register.
const REG_ENABLE_OUTPUT: u8 = 0x00;
/// First of the eighteen PWM value registers.
const REG_PWM_BASE: u8 = 0x01;
/// First of the three LED enable registers (six channels each).
const REG_ENABLE_LEDS: u8 = 0x13;
/// Update latch register; writing transfers PWM values to the outputs.
const REG_UPDATE: u8 = 0x16;
/// Reset register.
const REG_RESET: u8 = 0x17;

/// Channel offsets of the R, G and B LEDs within a zone.
const ZONE_CHANNELS: [usize; 3] = [2, 1, 0];

/// Backlight controller driver.
pub struct Backlight {
    i2c: I2c,
    values: [u8; ZONES * 3],
}

impl Backlight {
    /// Opens the backlight controller and enables all eighteen outputs,
    /// with every channel initially off.
    pub fn open(bus: u8) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(I2C_ADDR)?;

        i2c.write(&[REG_RESET, 0xFF])?;
        i2c.write(&[REG_ENABLE_OUTPUT, 0x01])?;
        i2c.write(&[REG_ENABLE_LEDS, 0x3F, 0x3F, 0x3F])?;
        i2c.write(&[REG_UPDATE, 0xFF])?;

        info!("Backlight opened (SN3218 at 0x{:02X}, bus {})", I2C_ADDR, bus);
        Ok(Self {
            i2c,
            values: [0; ZONES * 3],
        })
    }

    /// Sets the color of a single zone. Takes effect on `show()`.
    pub fn set_zone(&mut self, zone: u8, r: u8, g: u8, b: u8) -> Result<()> {
        if zone as usize >= ZONES {
            return Err(Error::InvalidZone(zone));
        }
        let base = zone as usize * 3;
        self.values[base + ZONE_CHANNELS[0]] = r;
        self.values[base + ZONE_CHANNELS[1]] = g;
        self.values[base + ZONE_CHANNELS[2]] = b;
        Ok(())
    }

    /// Sets every zone to the same color. Takes effect on `show()`.
    pub fn set_all(&mut self, r: u8, g: u8, b: u8) {
        for zone in 0..ZONES as u8 {
            // Zone index is always in range here
            let _ = self.set_zone(zone, r, g, b);
        }
    }

    /// Writes the staged values to the controller and latches them.
    pub fn show(&mut self) -> Result<()> {
        let mut packet = [0u8; 1 + ZONES * 3];
        packet[0] = REG_PWM_BASE;
        for (slot, value) in packet[1..].iter_mut().zip(self.values.iter()) {
            *slot = gamma(*value);
        }
        self.i2c.write(&packet)?;
        self.i2c.write(&[REG_UPDATE, 0xFF])?;
        debug!("backlight updated: {:?}", self.values);
        Ok(())
    }

    /// Switches the backlight off.
    pub fn off(&mut self) -> Result<()> {
        self.set_all(0, 0, 0);
        self.show()
    }
}

/// Perceptual gamma correction for the LED PWM duty cycle.
fn gamma(value: u8) -> u8 {
    let normalized = value as f32 / 255.0;
    (normalized.powf(2.8) * 255.0 + 0.5) as u8
}
