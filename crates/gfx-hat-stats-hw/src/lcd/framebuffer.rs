//! 1bpp framebuffer for the 128x64 LCD.
//!
//! Pixels are stored the way the ST7567 expects them on the wire:
//! page-major, eight rows per page, least significant bit at the top
//! of the page. `show()` can therefore stream the buffer unmodified.

use crate::{Error, Result, LCD_HEIGHT, LCD_WIDTH};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

/// Height of one display page in pixels.
pub const PAGE_HEIGHT: usize = 8;

/// Number of display pages.
pub const PAGE_COUNT: usize = LCD_HEIGHT as usize / PAGE_HEIGHT;

/// Total buffer size in bytes.
pub const BUFFER_SIZE: usize = LCD_WIDTH as usize * PAGE_COUNT;

/// Monochrome framebuffer for the 128x64 display.
#[derive(Clone)]
pub struct Framebuffer {
    data: Vec<u8>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Creates a new framebuffer with all pixels off.
    pub fn new() -> Self {
        Self {
            data: vec![0; BUFFER_SIZE],
        }
    }

    /// Returns a reference to the raw page-major pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the 128 bytes backing one display page.
    pub fn page(&self, page: usize) -> &[u8] {
        let start = page * LCD_WIDTH as usize;
        &self.data[start..start + LCD_WIDTH as usize]
    }

    /// Clears the framebuffer (all pixels off).
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Sets or clears a pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if x >= LCD_WIDTH || y >= LCD_HEIGHT {
            return;
        }
        let idx = (y as usize / PAGE_HEIGHT) * LCD_WIDTH as usize + x as usize;
        let bit = 1u8 << (y as usize % PAGE_HEIGHT);
        if on {
            self.data[idx] |= bit;
        } else {
            self.data[idx] &= !bit;
        }
    }

    /// Returns the state of a pixel, or `None` when out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<bool> {
        if x >= LCD_WIDTH || y >= LCD_HEIGHT {
            return None;
        }
        let idx = (y as usize / PAGE_HEIGHT) * LCD_WIDTH as usize + x as usize;
        let bit = 1u8 << (y as usize % PAGE_HEIGHT);
        Some(self.data[idx] & bit != 0)
    }

    /// Counts the lit pixels. Handy for render smoke tests.
    pub fn lit_pixels(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Replaces the buffer contents with raw page-major data.
    pub fn copy_from_raw(&mut self, data: &[u8]) -> Result<()> {
        if data.len() != BUFFER_SIZE {
            return Err(Error::FramebufferSize {
                expected: BUFFER_SIZE,
                actual: data.len(),
            });
        }
        self.data.copy_from_slice(data);
        Ok(())
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.set_pixel(coord.x as u32, coord.y as u32, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> std::result::Result<(), Self::Error> {
        self.data
            .fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(LCD_WIDTH, LCD_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    #[test]
    fn test_pixel_bit_layout() {
        let mut fb = Framebuffer::new();

        // (0, 0) is bit 0 of byte 0
        fb.set_pixel(0, 0, true);
        assert_eq!(fb.data()[0], 0b0000_0001);

        // (0, 7) is bit 7 of the same byte
        fb.set_pixel(0, 7, true);
        assert_eq!(fb.data()[0], 0b1000_0001);

        // (3, 8) starts the second page
        fb.set_pixel(3, 8, true);
        assert_eq!(fb.data()[128 + 3], 0b0000_0001);
    }

    #[test]
    fn test_set_and_clear_pixel() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(10, 20, true);
        assert_eq!(fb.pixel(10, 20), Some(true));

        fb.set_pixel(10, 20, false);
        assert_eq!(fb.pixel(10, 20), Some(false));

        // Out of range is ignored, not a panic
        fb.set_pixel(500, 500, true);
        assert_eq!(fb.pixel(500, 500), None);
    }

    #[test]
    fn test_page_slices() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(5, 63, true);
        assert_eq!(fb.page(7)[5], 0b1000_0000);
        assert_eq!(fb.page(0)[5], 0);
    }

    #[test]
    fn test_draw_target_line() {
        let mut fb = Framebuffer::new();
        Line::new(Point::new(0, 0), Point::new(9, 0))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.lit_pixels(), 10);
    }

    #[test]
    fn test_copy_from_raw_size_check() {
        let mut fb = Framebuffer::new();
        assert!(fb.copy_from_raw(&[0u8; 10]).is_err());
        assert!(fb.copy_from_raw(&[0xFFu8; BUFFER_SIZE]).is_ok());
        assert_eq!(fb.pixel(0, 0), Some(true));
    }
}
