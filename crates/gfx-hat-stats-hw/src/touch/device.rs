//! Touch controller communication via I2C.
//!
//! The board routes its six capacitive pads to a CAP1166. The controller
//! latches touches into the sensor input status register until the
//! interrupt flag in the main control register is cleared, so a polling
//! loop sees every press even between samples.

use rppal::i2c::I2c;
use tracing::{debug, info};

use crate::{Error, Result};

/// I2C address of the CAP1166.
pub const I2C_ADDR: u16 = 0x2C;

/// Main control register. Bit 0 is the interrupt latch.
const REG_MAIN_CONTROL: u8 = 0x00;
/// Sensor input status register, one bit per channel.
const REG_INPUT_STATUS: u8 = 0x03;
/// Per-channel interrupt enable register.
const REG_INTERRUPT_ENABLE: u8 = 0x27;
/// Per-channel repeat (auto-repeat) enable register.
const REG_REPEAT_ENABLE: u8 = 0x28;
/// Multiple touch configuration register.
const REG_MULTI_TOUCH: u8 = 0x2A;
/// Product id register.
const REG_PRODUCT_ID: u8 = 0xFD;

/// Product id reported by a CAP1166.
const PRODUCT_ID_CAP1166: u8 = 0x51;

/// Bit mask covering the six board channels.
const CHANNEL_MASK: u8 = 0x3F;

/// The six touch buttons, in controller channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    Up = 0,
    Down = 1,
    Back = 2,
    Minus = 3,
    Select = 4,
    Plus = 5,
}

impl Button {
    /// Maps a controller channel to its button.
    pub fn from_channel(channel: u8) -> Result<Self> {
        match channel {
            0 => Ok(Button::Up),
            1 => Ok(Button::Down),
            2 => Ok(Button::Back),
            3 => Ok(Button::Minus),
            4 => Ok(Button::Select),
            5 => Ok(Button::Plus),
            other => Err(Error::InvalidChannel(other)),
        }
    }

    /// The label printed next to the pad on the board.
    pub fn label(&self) -> &'static str {
        match self {
            Button::Up => "^",
            Button::Down => "v",
            Button::Back => "<",
            Button::Minus => "-",
            Button::Select => "o",
            Button::Plus => "+",
        }
    }
}

/// Touch transition direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Press,
    Release,
}

/// A single button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    pub button: Button,
    pub action: TouchAction,
}

/// Touch controller driver.
pub struct TouchDevice {
    i2c: I2c,
    last_state: u8,
}

impl TouchDevice {
    /// Opens the touch controller on the given I2C bus and configures it
    /// for polled operation.
    pub fn open(bus: u8) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(I2C_ADDR)?;

        let product_id = read_register(&mut i2c, REG_PRODUCT_ID)?;
        if product_id != PRODUCT_ID_CAP1166 {
            return Err(Error::UnexpectedProductId(product_id));
        }

        // All six channels latch into the status register, no auto-repeat,
        // and simultaneous touches are reported as-is.
        write_register(&mut i2c, REG_INTERRUPT_ENABLE, CHANNEL_MASK)?;
        write_register(&mut i2c, REG_REPEAT_ENABLE, 0x00)?;
        write_register(&mut i2c, REG_MULTI_TOUCH, 0x00)?;

        info!("Touch controller opened (CAP1166 at 0x{:02X}, bus {})", I2C_ADDR, bus);
        Ok(Self { i2c, last_state: 0 })
    }

    /// Samples the controller and returns the button transitions since the
    /// previous poll.
    pub fn poll(&mut self) -> Result<Vec<TouchEvent>> {
        let status = read_register(&mut self.i2c, REG_INPUT_STATUS)? & CHANNEL_MASK;

        // Clearing the interrupt latch re-arms the status register.
        let main = read_register(&mut self.i2c, REG_MAIN_CONTROL)?;
        if main & 0x01 != 0 {
            write_register(&mut self.i2c, REG_MAIN_CONTROL, main & !0x01)?;
        }

        let events = diff_events(self.last_state, status);
        if !events.is_empty() {
            debug!("touch transitions: {:?}", events);
        }
        self.last_state = status;
        Ok(events)
    }
}

fn read_register(i2c: &mut I2c, register: u8) -> Result<u8> {
    let mut buf = [0u8; 1];
    i2c.write_read(&[register], &mut buf)?;
    Ok(buf[0])
}

fn write_register(i2c: &mut I2c, register: u8, value: u8) -> Result<()> {
    i2c.write(&[register, value])?;
    Ok(())
}

/// Diffs two status samples into press/release events, channel order.
fn diff_events(previous: u8, current: u8) -> Vec<TouchEvent> {
    let mut events = Vec::new();
    for channel in 0..6u8 {
        let bit = 1 << channel;
        let was = previous & bit != 0;
        let is = current & bit != 0;
        if was == is {
            continue;
        }
        if let Ok(button) = Button::from_channel(channel) {
            events.push(TouchEvent {
                button,
                action: if is {
                    TouchAction::Press
                } else {
                    TouchAction::Release
                },
            });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_channels() {
        assert_eq!(Button::from_channel(3).unwrap(), Button::Minus);
        assert_eq!(Button::from_channel(5).unwrap(), Button::Plus);
        assert!(Button::from_channel(6).is_err());
    }

    #[test]
    fn test_diff_press_and_release() {
        let events = diff_events(0b000000, 0b101000);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].button, Button::Minus);
        assert_eq!(events[0].action, TouchAction::Press);
        assert_eq!(events[1].button, Button::Plus);
        assert_eq!(events[1].action, TouchAction::Press);

        let events = diff_events(0b101000, 0b100000);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].button, Button::Minus);
        assert_eq!(events[0].action, TouchAction::Release);
    }

    #[test]
    fn test_diff_no_change() {
        assert!(diff_events(0b010101, 0b010101).is_empty());
    }

    // Hardware tests are skipped by default
    #[test]
    #[ignore]
    fn test_device_open() {
        let device = TouchDevice::open(crate::I2C_BUS);
        assert!(device.is_ok());
    }
}
