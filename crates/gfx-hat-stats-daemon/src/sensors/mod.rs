//! System sensors module.
//!
//! Provides the system metrics shown on the display pages: CPU usage and
//! temperature, memory, filesystem usage, network throughput, wall clock,
//! and the file server's reachability.

mod cpu;
mod disk;
mod memory;
mod network;
mod service;
mod system;
mod temperature;

pub mod data;

pub use cpu::CpuSensor;
pub use disk::{DiskSpace, MountUsage};
pub use memory::MemorySensor;
pub use network::{local_ip, NetworkSensor};
pub use service::ServiceMonitor;
pub use system::Clock;
pub use temperature::TemperatureSensor;

/// Trait for rate/percentage sensors sampled once per refresh.
pub trait Sensor: Send + Sync {
    /// Samples the current value.
    fn sample(&mut self) -> f64;
}
