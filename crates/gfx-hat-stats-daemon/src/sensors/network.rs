//! Network throughput sensor and local address lookup.

use super::Sensor;
use std::fs;
use std::net::UdpSocket;
use std::time::Instant;
use tracing::info;

/// Network throughput sensor.
pub struct NetworkSensor {
    interface: String,
    last_rx: u64,
    last_tx: u64,
    last_time: Option<Instant>,
    last_rate: f64,
}

impl NetworkSensor {
    /// Creates a new network sensor for a specific interface.
    pub fn new(interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
            last_rx: 0,
            last_tx: 0,
            last_time: None,
            last_rate: 0.0,
        }
    }

    /// Creates a new network sensor with auto-detected interface.
    /// Tries to find the default gateway interface, falls back to the
    /// first active interface.
    pub fn auto() -> Self {
        let interface = Self::detect_interface().unwrap_or_else(|| "eth0".to_string());
        info!("Network sensor using interface: {}", interface);
        Self::new(&interface)
    }

    /// Detects the primary network interface from /proc/net/route.
    pub fn detect_interface() -> Option<String> {
        if let Ok(content) = fs::read_to_string("/proc/net/route") {
            if let Some(iface) = default_route_interface(&content) {
                return Some(iface);
            }
        }

        // Fallback: first non-loopback interface with statistics
        if let Ok(entries) = fs::read_dir("/sys/class/net") {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if name == "lo" || name.starts_with("veth") || name.starts_with("docker") {
                    continue;
                }
                let stats_path = format!("/sys/class/net/{}/statistics/rx_bytes", name);
                if fs::metadata(&stats_path).is_ok() {
                    return Some(name);
                }
            }
        }

        None
    }

    fn read_stats(&self) -> Option<(u64, u64)> {
        let rx_path = format!("/sys/class/net/{}/statistics/rx_bytes", self.interface);
        let tx_path = format!("/sys/class/net/{}/statistics/tx_bytes", self.interface);

        let rx = fs::read_to_string(&rx_path).ok()?.trim().parse().ok()?;
        let tx = fs::read_to_string(&tx_path).ok()?.trim().parse().ok()?;

        Some((rx, tx))
    }
}

/// Finds the interface carrying the default route (destination 00000000).
fn default_route_interface(route_table: &str) -> Option<String> {
    for line in route_table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 2 && fields[1] == "00000000" {
            return Some(fields[0].to_string());
        }
    }
    None
}

impl Sensor for NetworkSensor {
    /// Samples the combined send + receive rate in KB/s.
    fn sample(&mut self) -> f64 {
        if let Some((rx, tx)) = self.read_stats() {
            if let Some(last_time) = self.last_time {
                let elapsed = last_time.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    let rx_delta = rx.saturating_sub(self.last_rx);
                    let tx_delta = tx.saturating_sub(self.last_tx);
                    self.last_rate = (rx_delta + tx_delta) as f64 / 1024.0 / elapsed;
                }
            }

            self.last_rx = rx;
            self.last_tx = tx;
            self.last_time = Some(Instant::now());
        }

        self.last_rate
    }
}

/// Returns the local IP address used to reach the internet. Connecting a
/// UDP socket picks the outbound interface without sending any traffic.
pub fn local_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    Some(socket.local_addr().ok()?.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_route_interface() {
        let table = "Iface\tDestination\tGateway\tFlags\n\
                     eth0\t00000000\t0102A8C0\t0003\n\
                     eth0\t0002A8C0\t00000000\t0001\n";
        assert_eq!(default_route_interface(table), Some("eth0".to_string()));
    }

    #[test]
    fn test_no_default_route() {
        let table = "Iface\tDestination\tGateway\tFlags\n\
                     eth0\t0002A8C0\t00000000\t0001\n";
        assert_eq!(default_route_interface(table), None);
    }

    #[test]
    fn test_first_sample_is_zero() {
        let mut sensor = NetworkSensor::new("nonexistent0");
        assert_eq!(sensor.sample(), 0.0);
    }
}
