//! Overview page: IP address, file server status, time and date.
//!
//! Layout (128x64):
//! ```text
//! IP: 192.168.1.23
//! Copyparty: Port 8080
//! 18:45:12
//! 2024-06-01
//! ```

use super::Page;
use crate::sensors::data::SystemData;
use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use gfx_hat_stats_hw::Framebuffer;

/// Vertical positions of the four text rows.
const ROW_Y: [i32; 4] = [2, 18, 34, 50];

/// The overview page.
pub struct OverviewPage;

impl OverviewPage {
    /// Creates a new overview page.
    pub fn new() -> Self {
        Self
    }
}

impl Default for OverviewPage {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats the four text rows.
fn lines(data: &SystemData) -> [String; 4] {
    let ip = data.ip.as_deref().unwrap_or("No network");
    let copyparty = if data.copyparty_active {
        format!("Port {}", data.copyparty_port)
    } else {
        "Stopped".to_string()
    };
    [
        format!("IP: {}", ip),
        format!("Copyparty: {}", copyparty),
        data.time.clone(),
        data.date.clone(),
    ]
}

impl Page for OverviewPage {
    fn name(&self) -> &str {
        "overview"
    }

    fn render(&self, fb: &mut Framebuffer, data: &SystemData) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        for (line, y) in lines(data).iter().zip(ROW_Y) {
            let _ = Text::with_baseline(line, Point::new(2, y), style, Baseline::Top).draw(fb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_with_server_up() {
        let data = SystemData {
            ip: Some("10.0.0.5".to_string()),
            copyparty_active: true,
            copyparty_port: 8080,
            time: "01:02:03".to_string(),
            date: "2024-06-01".to_string(),
            ..Default::default()
        };
        let lines = lines(&data);
        assert_eq!(lines[0], "IP: 10.0.0.5");
        assert_eq!(lines[1], "Copyparty: Port 8080");
        assert_eq!(lines[2], "01:02:03");
    }

    #[test]
    fn test_lines_offline() {
        let data = SystemData::default();
        let lines = lines(&data);
        assert_eq!(lines[0], "IP: No network");
        assert_eq!(lines[1], "Copyparty: Stopped");
    }
}
