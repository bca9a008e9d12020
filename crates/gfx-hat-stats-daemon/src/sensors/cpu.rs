//! CPU usage sensor.

use super::Sensor;
use std::fs;

/// CPU usage sensor reading aggregate jiffies from /proc/stat.
pub struct CpuSensor {
    last_idle: u64,
    last_total: u64,
    last_sample: f64,
}

impl CpuSensor {
    /// Creates a new CPU sensor.
    pub fn new() -> Self {
        Self {
            last_idle: 0,
            last_total: 0,
            last_sample: 0.0,
        }
    }

    fn read_cpu_stats(&self) -> Option<(u64, u64)> {
        let content = fs::read_to_string("/proc/stat").ok()?;
        parse_proc_stat(&content)
    }
}

/// Parses the aggregate cpu line into (idle, total) jiffies.
fn parse_proc_stat(content: &str) -> Option<(u64, u64)> {
    let line = content.lines().next()?;
    let parts: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|s| s.parse().ok())
        .collect();

    if parts.len() >= 4 {
        let idle = parts[3];
        let total: u64 = parts.iter().sum();
        Some((idle, total))
    } else {
        None
    }
}

impl Default for CpuSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for CpuSensor {
    fn sample(&mut self) -> f64 {
        if let Some((idle, total)) = self.read_cpu_stats() {
            if self.last_total > 0 {
                let idle_delta = idle.saturating_sub(self.last_idle);
                let total_delta = total.saturating_sub(self.last_total);

                if total_delta > 0 {
                    self.last_sample = 100.0 * (1.0 - (idle_delta as f64 / total_delta as f64));
                }
            }

            self.last_idle = idle;
            self.last_total = total;
        }

        self.last_sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proc_stat() {
        let content = "cpu  100 0 50 800 10 0 5 0 0 0\ncpu0 25 0 12 200 2 0 1 0 0 0\n";
        let (idle, total) = parse_proc_stat(content).unwrap();
        assert_eq!(idle, 800);
        assert_eq!(total, 965);
    }

    #[test]
    fn test_parse_short_line() {
        assert!(parse_proc_stat("cpu 1 2\n").is_none());
        assert!(parse_proc_stat("").is_none());
    }

    #[test]
    fn test_first_sample_is_zero() {
        let mut sensor = CpuSensor::new();
        // The first delta has no baseline yet
        let value = sensor.sample();
        assert_eq!(value, 0.0);
    }
}
