//! System data aggregation for the display pages.

use super::DiskSpace;

/// Aggregated system data from all sensors, one snapshot per refresh.
#[derive(Debug, Clone, Default)]
pub struct SystemData {
    /// Local IP address, if the machine has a route out
    pub ip: Option<String>,
    /// Whether the file server is up
    pub copyparty_active: bool,
    /// Port the file server listens on
    pub copyparty_port: u16,
    /// Current time formatted as "HH:MM:SS"
    pub time: String,
    /// Current date formatted as "YYYY-MM-DD"
    pub date: String,
    /// SD card (root filesystem) usage
    pub sd: Option<DiskSpace>,
    /// NVMe storage usage, None when the mount is absent
    pub nvme: Option<DiskSpace>,
    /// RAM usage percentage (0-100)
    pub ram_percent: f64,
    /// RAM used in GB
    pub ram_used_gb: f64,
    /// RAM total in GB
    pub ram_total_gb: f64,
    /// CPU usage percentage (0-100)
    pub cpu_percent: f64,
    /// CPU temperature in degrees Celsius, if readable
    pub cpu_temp: Option<f64>,
    /// Combined network throughput in KB/s
    pub net_kbps: f64,
    /// Recent CPU usage samples, oldest first
    pub cpu_history: Vec<f64>,
    /// Recent network throughput samples in KB/s, oldest first
    pub net_history: Vec<f64>,
}
