//! Storage page: SD card, NVMe storage, and RAM usage.
//!
//! Layout (128x64):
//! ```text
//! SD: 41% (11.8/28.9GB)
//! NVMe: 63%
//! 589/931GB
//! RAM: 22% (0.9/3.9GB)
//! ```

use super::Page;
use crate::sensors::data::SystemData;
use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use gfx_hat_stats_hw::Framebuffer;

const ROW_Y: [i32; 4] = [2, 18, 34, 50];

/// The storage page.
pub struct StoragePage;

impl StoragePage {
    /// Creates a new storage page.
    pub fn new() -> Self {
        Self
    }
}

impl Default for StoragePage {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats the four text rows.
fn lines(data: &SystemData) -> [String; 4] {
    let sd = match data.sd {
        Some(sd) => format!(
            "SD: {:.0}% ({:.1}/{:.1}GB)",
            sd.percent, sd.used_gb, sd.total_gb
        ),
        None => "SD: N/A".to_string(),
    };

    let (nvme, nvme_detail) = match data.nvme {
        Some(nvme) => (
            format!("NVMe: {:.0}%", nvme.percent),
            format!("{:.0}/{:.0}GB", nvme.used_gb, nvme.total_gb),
        ),
        None => ("NVMe: N/A".to_string(), String::new()),
    };

    let ram = format!(
        "RAM: {:.0}% ({:.1}/{:.1}GB)",
        data.ram_percent, data.ram_used_gb, data.ram_total_gb
    );

    [sd, nvme, nvme_detail, ram]
}

impl Page for StoragePage {
    fn name(&self) -> &str {
        "storage"
    }

    fn render(&self, fb: &mut Framebuffer, data: &SystemData) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        for (line, y) in lines(data).iter().zip(ROW_Y) {
            if line.is_empty() {
                continue;
            }
            let _ = Text::with_baseline(line, Point::new(2, y), style, Baseline::Top).draw(fb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::DiskSpace;

    #[test]
    fn test_lines_with_all_mounts() {
        let data = SystemData {
            sd: Some(DiskSpace {
                percent: 41.2,
                used_gb: 11.8,
                total_gb: 28.9,
            }),
            nvme: Some(DiskSpace {
                percent: 63.3,
                used_gb: 589.0,
                total_gb: 931.0,
            }),
            ram_percent: 22.0,
            ram_used_gb: 0.9,
            ram_total_gb: 3.9,
            ..Default::default()
        };
        let lines = lines(&data);
        assert_eq!(lines[0], "SD: 41% (11.8/28.9GB)");
        assert_eq!(lines[1], "NVMe: 63%");
        assert_eq!(lines[2], "589/931GB");
        assert_eq!(lines[3], "RAM: 22% (0.9/3.9GB)");
    }

    #[test]
    fn test_lines_without_nvme() {
        let data = SystemData::default();
        let lines = lines(&data);
        assert_eq!(lines[1], "NVMe: N/A");
        assert!(lines[2].is_empty());
    }
}
