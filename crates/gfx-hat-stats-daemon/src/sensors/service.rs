//! File server reachability monitor.
//!
//! Asks systemd for the unit's ActiveState over D-Bus; when the unit is
//! not loaded (or D-Bus is unavailable) falls back to scanning process
//! command lines, so servers started by hand still show as running.
//!
//! Uses the blocking zbus API, so `is_active` must be called from a
//! blocking thread (`spawn_blocking`), never from an async worker.

use std::fs;
use tracing::debug;
use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::OwnedObjectPath;

/// Reachability monitor for one systemd unit.
pub struct ServiceMonitor {
    unit: String,
    pattern: String,
    conn: Option<Connection>,
}

impl ServiceMonitor {
    /// Creates a monitor for a unit such as `copyparty.service`.
    pub fn new(unit: &str) -> Self {
        let pattern = unit.trim_end_matches(".service").to_string();
        Self {
            unit: unit.to_string(),
            pattern,
            conn: None,
        }
    }

    /// Returns whether the service is up.
    pub fn is_active(&mut self) -> bool {
        match self.systemd_active() {
            Some(true) => true,
            _ => process_running(&self.pattern),
        }
    }

    fn systemd_active(&mut self) -> Option<bool> {
        if self.conn.is_none() {
            self.conn = Connection::system().ok();
        }
        let conn = self.conn.as_ref()?;

        let manager = Proxy::new(
            conn,
            "org.freedesktop.systemd1",
            "/org/freedesktop/systemd1",
            "org.freedesktop.systemd1.Manager",
        )
        .ok()?;

        // GetUnit fails for units that are not loaded; that is the
        // fallback path, not an error worth surfacing.
        let (path,): (OwnedObjectPath,) = manager.call("GetUnit", &(self.unit.as_str(),)).ok()?;

        let unit_proxy = Proxy::new(
            conn,
            "org.freedesktop.systemd1",
            path,
            "org.freedesktop.systemd1.Unit",
        )
        .ok()?;
        let state: String = unit_proxy.get_property("ActiveState").ok()?;
        debug!("{} ActiveState={}", self.unit, state);
        Some(state == "active")
    }
}

/// Scans /proc for a process whose command line contains the pattern.
fn process_running(pattern: &str) -> bool {
    let entries = match fs::read_dir("/proc") {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(pid) = name.to_str().filter(|n| n.chars().all(|c| c.is_ascii_digit()))
        else {
            continue;
        };
        let cmdline_path = format!("/proc/{}/cmdline", pid);
        if let Ok(cmdline) = fs::read(&cmdline_path) {
            let cmdline = String::from_utf8_lossy(&cmdline);
            if cmdline.contains(pattern) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_strips_unit_suffix() {
        let monitor = ServiceMonitor::new("copyparty.service");
        assert_eq!(monitor.pattern, "copyparty");
    }

    #[test]
    fn test_own_process_is_found() {
        // The test binary's own cmdline contains its executable name
        assert!(process_running("gfx_hat_stats"));
    }

    #[test]
    fn test_absent_process() {
        assert!(!process_running("no-such-process-name-zzz"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_is_active_from_blocking_thread() {
        // The daemon's loops call this through spawn_blocking; the
        // blocking D-Bus connection would panic on a runtime worker.
        let active = tokio::task::spawn_blocking(|| {
            let mut monitor = ServiceMonitor::new("no-such-unit.service");
            monitor.is_active()
        })
        .await
        .unwrap();
        assert!(!active);
    }
}
