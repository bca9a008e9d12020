//! CPU temperature sensor.

use std::fs;

/// Sysfs thermal zone of the SoC.
const THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// CPU temperature sensor.
pub struct TemperatureSensor {
    path: String,
}

impl TemperatureSensor {
    /// Creates a new temperature sensor for the default thermal zone.
    pub fn new() -> Self {
        Self {
            path: THERMAL_ZONE.to_string(),
        }
    }

    /// Returns the CPU temperature in degrees Celsius, if readable.
    pub fn temperature(&self) -> Option<f64> {
        let content = fs::read_to_string(&self.path).ok()?;
        parse_millidegrees(&content)
    }
}

impl Default for TemperatureSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a sysfs millidegree reading into degrees Celsius.
fn parse_millidegrees(content: &str) -> Option<f64> {
    content.trim().parse::<f64>().ok().map(|v| v / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_millidegrees() {
        assert_eq!(parse_millidegrees("52100\n"), Some(52.1));
        assert_eq!(parse_millidegrees("garbage"), None);
    }
}
