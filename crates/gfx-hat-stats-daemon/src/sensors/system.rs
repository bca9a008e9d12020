//! Wall clock for the overview page.

use chrono::Local;

/// Local time and date formatter.
pub struct Clock;

impl Clock {
    /// Creates a new clock.
    pub fn new() -> Self {
        Self
    }

    /// Returns the current time as "HH:MM:SS".
    pub fn time(&self) -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    /// Returns the current date as "YYYY-MM-DD".
    pub fn date(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        let clock = Clock::new();
        assert_eq!(clock.time().len(), 8);
        assert_eq!(clock.date().len(), 10);
        assert_eq!(clock.date().matches('-').count(), 2);
    }
}
