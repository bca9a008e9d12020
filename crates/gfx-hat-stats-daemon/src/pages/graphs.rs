//! Graphs page: rolling CPU and network usage bar graphs.
//!
//! Layout (128x64):
//! ```text
//! CPU 45% 52C
//! [############      ]   <- 20px graph
//! NET 120KB/s
//! [#####             ]   <- 18px graph
//! ```

use super::Page;
use crate::sensors::data::SystemData;
use embedded_graphics::mono_font::{ascii::FONT_5X8, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use gfx_hat_stats_hw::{Framebuffer, LCD_WIDTH};

/// Network rate treated as full scale, in KB/s.
const NET_FULL_SCALE_KBPS: f64 = 1000.0;

/// The graphs page.
pub struct GraphsPage;

impl GraphsPage {
    /// Creates a new graphs page.
    pub fn new() -> Self {
        Self
    }
}

impl Default for GraphsPage {
    fn default() -> Self {
        Self::new()
    }
}

/// Scales a value into a bar height, leaving room for the graph border.
fn bar_height(value: f64, max_value: f64, graph_height: u32) -> u32 {
    if value <= 0.0 || max_value <= 0.0 || graph_height < 2 {
        return 0;
    }
    let usable = graph_height - 2;
    (((value / max_value) * usable as f64) as u32).min(usable)
}

/// Scales network KB/s onto the 0-100 graph range.
fn scale_net(kbps: f64) -> f64 {
    ((kbps / NET_FULL_SCALE_KBPS) * 100.0).min(100.0)
}

/// Draws a bordered horizontal bar graph, one column per sample.
fn draw_graph(fb: &mut Framebuffer, history: &[f64], y_start: i32, height: u32, max_value: f64) {
    let _ = Rectangle::new(
        Point::new(0, y_start),
        Size::new(LCD_WIDTH, height),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
    .draw(fb);

    let columns = LCD_WIDTH as usize - 2;
    let take = history.len().min(columns);
    let recent = &history[history.len() - take..];

    for (i, &value) in recent.iter().enumerate() {
        let bar = bar_height(value, max_value, height);
        if bar == 0 {
            continue;
        }
        let x = 1 + i as i32;
        let y_bottom = y_start + height as i32 - 2;
        let y_top = y_bottom - bar as i32 + 1;
        let _ = Line::new(Point::new(x, y_top), Point::new(x, y_bottom))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(fb);
    }
}

impl Page for GraphsPage {
    fn name(&self) -> &str {
        "graphs"
    }

    fn render(&self, fb: &mut Framebuffer, data: &SystemData) {
        let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);

        let cpu_label = match data.cpu_temp {
            Some(temp) => format!("CPU {:.0}% {:.0}C", data.cpu_percent, temp),
            None => format!("CPU {:.0}%", data.cpu_percent),
        };
        let _ = Text::with_baseline(&cpu_label, Point::new(2, 0), style, Baseline::Top).draw(fb);
        draw_graph(fb, &data.cpu_history, 12, 20, 100.0);

        let net_label = format!("NET {:.0}KB/s", data.net_kbps);
        let _ = Text::with_baseline(&net_label, Point::new(2, 34), style, Baseline::Top).draw(fb);
        let scaled: Vec<f64> = data.net_history.iter().map(|&v| scale_net(v)).collect();
        draw_graph(fb, &scaled, 46, 18, 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_height_scaling() {
        assert_eq!(bar_height(0.0, 100.0, 20), 0);
        assert_eq!(bar_height(50.0, 100.0, 20), 9);
        assert_eq!(bar_height(100.0, 100.0, 20), 18);
        // Values above full scale are clamped
        assert_eq!(bar_height(250.0, 100.0, 20), 18);
    }

    #[test]
    fn test_scale_net_clamps() {
        assert_eq!(scale_net(0.0), 0.0);
        assert_eq!(scale_net(500.0), 50.0);
        assert_eq!(scale_net(5000.0), 100.0);
    }

    #[test]
    fn test_graph_stays_inside_border() {
        let mut fb = Framebuffer::new();
        let history = vec![100.0; 300];
        draw_graph(&mut fb, &history, 12, 20, 100.0);
        // Border corners are drawn, row above the graph is untouched
        assert_eq!(fb.pixel(0, 12), Some(true));
        assert_eq!(fb.pixel(127, 31), Some(true));
        assert_eq!(fb.pixel(64, 11), Some(false));
        assert_eq!(fb.pixel(64, 32), Some(false));
    }
}
