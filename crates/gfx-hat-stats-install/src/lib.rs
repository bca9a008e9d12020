//! Installer for the GFX HAT stats display service.
//!
//! Installs the display daemon onto a DietPi Raspberry Pi: checks the
//! runtime packages, probes for the GFX HAT bus devices, runs the vendor
//! setup script when they are missing, deploys the daemon binary, and
//! registers the systemd unit.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use std::os::unix::fs::PermissionsExt;

/// Packages the daemon needs at runtime, installed via apt.
pub const PACKAGES: &[&str] = &["i2c-tools", "spi-tools"];

/// Where the daemon binary is deployed.
pub const DAEMON_DEST: &str = "/home/dietpi/gfx-hat-statsd";

/// Name of the daemon binary, both in the deploy source dir and at the
/// destination.
pub const DAEMON_BIN: &str = "gfx-hat-statsd";

/// Installed path of the systemd unit.
pub const UNIT_PATH: &str = "/etc/systemd/system/gfx-hat-stats.service";

/// Name of the systemd unit.
pub const UNIT_NAME: &str = "gfx-hat-stats.service";

/// Pimoroni's one-line setup script for the GFX HAT. Enables the SPI and
/// I2C bus overlays in the boot config.
pub const BOOTSTRAP_URL: &str = "https://get.pimoroni.com/gfxhat";

/// Environment variable overriding the deploy source directory.
pub const SOURCE_DIR_ENV: &str = "GFX_HAT_INSTALL_SRC";

/// The unit file shipped with the installer.
pub const UNIT_FILE: &str = include_str!("../../../services/gfx-hat-stats.service");

/// The installer's effectful steps, factored behind a trait so the
/// sequencing and the cold-start guard can be tested without touching
/// the machine.
pub trait InstallSteps {
    fn ensure_runtime_dependencies(&mut self) -> Result<()>;
    fn hardware_ready(&mut self) -> bool;
    fn bootstrap_vendor_setup(&mut self) -> Result<()>;
    fn deploy_daemon(&mut self) -> Result<()>;
    fn install_service_unit(&mut self) -> Result<()>;
    fn report(&mut self) -> Result<()>;
}

/// End-state of a successful installer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Cold-start branch: the vendor setup ran, a reboot is needed
    /// before the installer can finish.
    RebootRequired,
    /// The daemon is deployed and the unit is running.
    Installed,
}

/// Runs the installer steps in their forced order. Fail-fast: the first
/// failing step aborts the run. The one branch is the missing-hardware
/// guard, which runs the vendor bootstrap and ends the run successfully.
pub fn run<S: InstallSteps>(steps: &mut S) -> Result<Outcome> {
    steps.ensure_runtime_dependencies()?;

    if !steps.hardware_ready() {
        steps.bootstrap_vendor_setup()?;
        return Ok(Outcome::RebootRequired);
    }

    steps.deploy_daemon()?;
    steps.install_service_unit()?;
    steps.report()?;
    Ok(Outcome::Installed)
}

/// Writes `data` to `path` via a temp file and rename, so a crash never
/// leaves a half-written file at the destination.
pub fn atomic_write(path: &Path, data: &[u8], mode: u32) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("missing parent dir for {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let tmp = temp_path(path);
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp)
        .with_context(|| format!("open {}", tmp.display()))?;
    file.write_all(data)
        .with_context(|| format!("write {}", tmp.display()))?;
    file.sync_all()
        .with_context(|| format!("sync {}", tmp.display()))?;

    let perms = fs::Permissions::from_mode(mode);
    fs::set_permissions(&tmp, perms).with_context(|| format!("chmod {}", tmp.display()))?;

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    fsync_parent(path)?;
    Ok(())
}

/// Copies `src` to `dest` atomically with the given mode.
pub fn atomic_copy(src: &Path, dest: &Path, mode: u32) -> Result<()> {
    let data = fs::read(src).with_context(|| format!("read {}", src.display()))?;
    atomic_write(dest, &data, mode)
}

fn temp_path(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("file");
    dest.with_file_name(format!("{}.new", file_name))
}

fn fsync_parent(path: &Path) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("missing parent dir for {}", path.display()))?;
    let dir = File::open(parent).with_context(|| format!("open {}", parent.display()))?;
    dir.sync_all()
        .with_context(|| format!("sync {}", parent.display()))?;
    Ok(())
}

/// Returns true when the GFX HAT bus devices are present. Both the SPI
/// device (LCD) and the I2C bus (touch, backlight) must exist, which
/// requires the boot overlays the vendor script enables.
pub fn hardware_ready() -> bool {
    buses_present(Path::new("/dev/spidev0.0"), Path::new("/dev/i2c-1"))
}

fn buses_present(spi: &Path, i2c: &Path) -> bool {
    spi.exists() && i2c.exists()
}

/// Usage summary printed at the end of a successful install.
pub fn usage_summary() -> String {
    let mut out = String::new();
    out.push_str("GFX HAT stats display installed.\n");
    out.push_str("\n");
    out.push_str("Pages (cycle with the touch buttons):\n");
    out.push_str("  Page 1: IP address, Copyparty status, time and date\n");
    out.push_str("  Page 2: SD card, NVMe and RAM usage\n");
    out.push_str("  Page 3: CPU and network graphs\n");
    out.push_str("\n");
    out.push_str("Buttons:\n");
    out.push_str("  -      : previous page\n");
    out.push_str("  +      : next page\n");
    out.push_str("  select : backlight on/off\n");
    out.push_str("\n");
    out.push_str("Logs: journalctl -u gfx-hat-stats -f\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gfx-hat-install-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_atomic_write_creates_file_with_mode() {
        let dir = temp_dir("write");
        let path = dir.join("unit.service");
        atomic_write(&path, b"[Unit]\n", 0o644).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[Unit]\n");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_atomic_copy_preserves_content() {
        let dir = temp_dir("copy");
        let src = dir.join("src.bin");
        let dest = dir.join("dest.bin");
        fs::write(&src, b"daemon").unwrap();
        atomic_copy(&src, &dest, 0o755).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"daemon");
        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_buses_present_requires_both_devices() {
        let dir = temp_dir("buses");
        let spi = dir.join("spidev0.0");
        let i2c = dir.join("i2c-1");
        assert!(!buses_present(&spi, &i2c));
        fs::write(&spi, b"").unwrap();
        assert!(!buses_present(&spi, &i2c));
        fs::write(&i2c, b"").unwrap();
        assert!(buses_present(&spi, &i2c));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_summary_lists_three_pages_and_three_buttons() {
        let summary = usage_summary();
        let pages = summary.lines().filter(|l| l.trim_start().starts_with("Page ")).count();
        assert_eq!(pages, 3);
        assert!(summary.contains("previous page"));
        assert!(summary.contains("next page"));
        assert!(summary.contains("backlight on/off"));
        assert!(summary.contains("journalctl -u gfx-hat-stats"));
    }

    #[derive(Default)]
    struct FakeSteps {
        hardware_present: bool,
        fail_on: Option<&'static str>,
        calls: Vec<&'static str>,
    }

    impl FakeSteps {
        fn step(&mut self, name: &'static str) -> Result<()> {
            self.calls.push(name);
            if self.fail_on == Some(name) {
                anyhow::bail!("{} failed", name);
            }
            Ok(())
        }
    }

    impl InstallSteps for FakeSteps {
        fn ensure_runtime_dependencies(&mut self) -> Result<()> {
            self.step("deps")
        }

        fn hardware_ready(&mut self) -> bool {
            self.calls.push("probe");
            self.hardware_present
        }

        fn bootstrap_vendor_setup(&mut self) -> Result<()> {
            self.step("bootstrap")
        }

        fn deploy_daemon(&mut self) -> Result<()> {
            self.step("deploy")
        }

        fn install_service_unit(&mut self) -> Result<()> {
            self.step("service")
        }

        fn report(&mut self) -> Result<()> {
            self.step("report")
        }
    }

    #[test]
    fn test_cold_start_stops_before_deploy() {
        let mut steps = FakeSteps::default();
        let outcome = run(&mut steps).unwrap();
        assert_eq!(outcome, Outcome::RebootRequired);
        // No deploy, no service-manager mutation, no report
        assert_eq!(steps.calls, ["deps", "probe", "bootstrap"]);
    }

    #[test]
    fn test_ready_hardware_never_bootstraps() {
        let mut steps = FakeSteps {
            hardware_present: true,
            ..Default::default()
        };
        let outcome = run(&mut steps).unwrap();
        assert_eq!(outcome, Outcome::Installed);
        assert_eq!(steps.calls, ["deps", "probe", "deploy", "service", "report"]);
    }

    #[test]
    fn test_failed_step_prevents_later_steps() {
        let mut steps = FakeSteps {
            hardware_present: true,
            fail_on: Some("deps"),
            ..Default::default()
        };
        assert!(run(&mut steps).is_err());
        assert_eq!(steps.calls, ["deps"]);

        let mut steps = FakeSteps {
            hardware_present: true,
            fail_on: Some("deploy"),
            ..Default::default()
        };
        assert!(run(&mut steps).is_err());
        assert_eq!(steps.calls, ["deps", "probe", "deploy"]);
    }

    #[test]
    fn test_unit_file_sanity() {
        assert!(UNIT_FILE.contains("[Unit]"));
        assert!(UNIT_FILE.contains(&format!("ExecStart={}", DAEMON_DEST)));
        assert!(UNIT_FILE.contains("WantedBy=multi-user.target"));
        assert!(UNIT_FILE.contains("Restart=on-failure"));
    }
}
