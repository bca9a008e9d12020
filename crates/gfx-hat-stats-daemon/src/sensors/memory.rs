//! Memory usage sensor.

use super::Sensor;
use std::fs;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Memory usage sensor reading /proc/meminfo.
pub struct MemorySensor {
    total_kb: u64,
    used_kb: u64,
}

impl MemorySensor {
    /// Creates a new memory sensor.
    pub fn new() -> Self {
        let total_kb = Self::read_total_memory().unwrap_or(0);
        Self {
            total_kb,
            used_kb: 0,
        }
    }

    fn read_total_memory() -> Option<u64> {
        let content = fs::read_to_string("/proc/meminfo").ok()?;
        read_meminfo_field(&content, "MemTotal:")
    }

    fn read_available_memory() -> Option<u64> {
        let content = fs::read_to_string("/proc/meminfo").ok()?;
        read_meminfo_field(&content, "MemAvailable:")
    }

    /// Returns the used memory in GB, as of the last sample.
    pub fn used_gb(&self) -> f64 {
        self.used_kb as f64 * 1024.0 / GIB
    }

    /// Returns the total memory in GB.
    pub fn total_gb(&self) -> f64 {
        self.total_kb as f64 * 1024.0 / GIB
    }
}

fn read_meminfo_field(content: &str, field: &str) -> Option<u64> {
    for line in content.lines() {
        if line.starts_with(field) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 2 {
                return parts[1].parse().ok();
            }
        }
    }
    None
}

impl Default for MemorySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for MemorySensor {
    fn sample(&mut self) -> f64 {
        if let Some(available) = Self::read_available_memory() {
            if self.total_kb > 0 {
                self.used_kb = self.total_kb.saturating_sub(available);
                return 100.0 * (self.used_kb as f64 / self.total_kb as f64);
            }
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_meminfo_field() {
        let content = "MemTotal:       8000000 kB\nMemFree:        123 kB\nMemAvailable:   6000000 kB\n";
        assert_eq!(read_meminfo_field(content, "MemTotal:"), Some(8_000_000));
        assert_eq!(read_meminfo_field(content, "MemAvailable:"), Some(6_000_000));
        assert_eq!(read_meminfo_field(content, "SwapTotal:"), None);
    }

    #[test]
    fn test_gb_conversion() {
        let sensor = MemorySensor {
            total_kb: 4 * 1024 * 1024,
            used_kb: 1024 * 1024,
        };
        assert!((sensor.total_gb() - 4.0).abs() < 1e-9);
        assert!((sensor.used_gb() - 1.0).abs() < 1e-9);
    }
}
