//! Display pages.
//!
//! Three full-screen layouts cycled with the minus and plus buttons:
//! overview (IP, file server, clock), storage, and usage graphs.

mod graphs;
mod overview;
mod storage;

pub use graphs::GraphsPage;
pub use overview::OverviewPage;
pub use storage::StoragePage;

use crate::sensors::data::SystemData;
use gfx_hat_stats_hw::Framebuffer;

/// Number of pages.
pub const PAGE_COUNT: usize = 3;

/// Trait for display pages.
pub trait Page: Send + Sync {
    /// Returns the name of the page.
    fn name(&self) -> &str;

    /// Renders the page onto the framebuffer from the current snapshot.
    fn render(&self, fb: &mut Framebuffer, data: &SystemData);
}

/// Creates the pages in display order.
pub fn pages() -> Vec<Box<dyn Page>> {
    vec![
        Box::new(OverviewPage::new()),
        Box::new(StoragePage::new()),
        Box::new(GraphsPage::new()),
    ]
}

/// Advances to the next page, wrapping around.
pub fn next_page(current: usize) -> usize {
    (current + 1) % PAGE_COUNT
}

/// Goes back to the previous page, wrapping around.
pub fn prev_page(current: usize) -> usize {
    (current + PAGE_COUNT - 1) % PAGE_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        assert_eq!(next_page(0), 1);
        assert_eq!(next_page(2), 0);
        assert_eq!(prev_page(0), 2);
        assert_eq!(prev_page(1), 0);
    }

    #[test]
    fn test_three_pages() {
        assert_eq!(pages().len(), PAGE_COUNT);
    }

    #[test]
    fn test_every_page_draws_something() {
        let data = SystemData {
            time: "12:34:56".to_string(),
            date: "2024-06-01".to_string(),
            copyparty_port: 8080,
            ram_total_gb: 4.0,
            ram_used_gb: 1.0,
            ram_percent: 25.0,
            cpu_percent: 42.0,
            net_kbps: 120.0,
            cpu_history: vec![50.0; 64],
            net_history: vec![100.0; 64],
            ..Default::default()
        };

        for page in pages() {
            let mut fb = Framebuffer::new();
            page.render(&mut fb, &data);
            assert!(fb.lit_pixels() > 0, "page {} rendered blank", page.name());
        }
    }
}
