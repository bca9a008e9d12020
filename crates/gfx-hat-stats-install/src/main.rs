//! GFX HAT stats installer.
//!
//! Run as root on the target Pi. Two-phase: on a box without the GFX HAT
//! overlays enabled it runs the vendor setup script and asks for a reboot;
//! on a prepared box it deploys the daemon and starts the systemd unit.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use zbus::zvariant::OwnedObjectPath;
use zbus::{Connection, Proxy};

use gfx_hat_stats_install::{
    atomic_copy, atomic_write, hardware_ready, run, usage_summary, InstallSteps, BOOTSTRAP_URL,
    DAEMON_BIN, DAEMON_DEST, PACKAGES, SOURCE_DIR_ENV, UNIT_FILE, UNIT_NAME, UNIT_PATH,
};

/// The real steps, run against the machine. The systemd steps speak
/// D-Bus asynchronously, so they carry a runtime to drive them.
struct Installer {
    runtime: tokio::runtime::Runtime,
}

impl InstallSteps for Installer {
    fn ensure_runtime_dependencies(&mut self) -> Result<()> {
        ensure_runtime_dependencies()
    }

    fn hardware_ready(&mut self) -> bool {
        hardware_ready()
    }

    fn bootstrap_vendor_setup(&mut self) -> Result<()> {
        bootstrap_vendor_setup()
    }

    fn deploy_daemon(&mut self) -> Result<()> {
        deploy_daemon()
    }

    fn install_service_unit(&mut self) -> Result<()> {
        self.runtime.block_on(install_service_unit())
    }

    fn report(&mut self) -> Result<()> {
        self.runtime.block_on(report())
    }
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build async runtime")?;

    let mut installer = Installer { runtime };
    run(&mut installer)?;
    Ok(())
}

/// Installs the runtime packages via apt.
fn ensure_runtime_dependencies() -> Result<()> {
    println!("Installing runtime packages: {}", PACKAGES.join(", "));
    let status = Command::new("apt-get")
        .arg("install")
        .arg("-y")
        .args(PACKAGES)
        .status()
        .context("run apt-get")?;
    if !status.success() {
        bail!("apt-get install failed with {}", status);
    }
    Ok(())
}

/// Runs the vendor setup script to enable the SPI and I2C overlays, then
/// asks the user to reboot and rerun the installer.
fn bootstrap_vendor_setup() -> Result<()> {
    println!("GFX HAT bus devices not found; running the Pimoroni setup script.");
    println!("Note: this pipes a script from {} straight into bash.", BOOTSTRAP_URL);
    println!("Review it first if that concerns you.");

    let status = Command::new("bash")
        .arg("-c")
        .arg(format!("curl -sS {} | bash", BOOTSTRAP_URL))
        .status()
        .context("run vendor setup script")?;
    if !status.success() {
        bail!("vendor setup script failed with {}", status);
    }

    println!();
    println!("Setup complete. Reboot now, then run this installer again.");
    Ok(())
}

/// Copies the daemon binary next to the installer (or from the directory
/// named by GFX_HAT_INSTALL_SRC) to its installed path.
fn deploy_daemon() -> Result<()> {
    let src = daemon_source()?;
    println!("Deploying {} -> {}", src.display(), DAEMON_DEST);
    atomic_copy(&src, Path::new(DAEMON_DEST), 0o755)
        .with_context(|| format!("deploy {}", DAEMON_BIN))?;
    Ok(())
}

fn daemon_source() -> Result<PathBuf> {
    let dir = match std::env::var_os(SOURCE_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let exe = std::env::current_exe().context("locate installer binary")?;
            exe.parent()
                .map(Path::to_path_buf)
                .context("installer binary has no parent dir")?
        }
    };
    let src = dir.join(DAEMON_BIN);
    if !src.is_file() {
        bail!("daemon binary not found at {}", src.display());
    }
    Ok(src)
}

/// Writes the unit file and enables and starts it through the systemd
/// D-Bus API.
async fn install_service_unit() -> Result<()> {
    atomic_write(Path::new(UNIT_PATH), UNIT_FILE.as_bytes(), 0o644)
        .with_context(|| format!("write {}", UNIT_PATH))?;

    let conn = Connection::system().await.context("dbus connect")?;
    let manager = manager_proxy(&conn).await?;

    let _: () = manager.call("Reload", &()).await.context("reload units")?;

    let (_result, _changes): (bool, Vec<(String, String, String)>) = manager
        .call("EnableUnitFiles", &(vec![UNIT_NAME], false, true))
        .await
        .context("enable unit file")?;

    start_unit_if_inactive(&conn, &manager)
        .await
        .with_context(|| format!("start {}", UNIT_NAME))?;

    println!("Installed and started {}", UNIT_NAME);
    Ok(())
}

async fn manager_proxy(conn: &Connection) -> Result<Proxy<'_>> {
    Proxy::new(
        conn,
        "org.freedesktop.systemd1",
        "/org/freedesktop/systemd1",
        "org.freedesktop.systemd1.Manager",
    )
    .await
    .context("dbus proxy")
}

async fn start_unit_if_inactive(conn: &Connection, manager: &Proxy<'_>) -> Result<()> {
    if let Ok(state) = unit_active_state(conn, manager).await {
        if state == "active" || state == "activating" {
            return Ok(());
        }
    }

    let (_job,): (OwnedObjectPath,) = manager
        .call("StartUnit", &(UNIT_NAME, "replace"))
        .await
        .with_context(|| format!("start unit {}", UNIT_NAME))?;
    Ok(())
}

async fn unit_active_state(conn: &Connection, manager: &Proxy<'_>) -> Result<String> {
    let (path,): (OwnedObjectPath,) = manager.call("GetUnit", &(UNIT_NAME)).await?;
    let unit = Proxy::new(
        conn,
        "org.freedesktop.systemd1",
        path.as_str(),
        "org.freedesktop.systemd1.Unit",
    )
    .await?;
    let state: String = unit.get_property("ActiveState").await?;
    Ok(state)
}

/// Prints the usage summary and the current state of the unit.
async fn report() -> Result<()> {
    println!();
    print!("{}", usage_summary());

    match service_state().await {
        Ok((active, file_state)) => {
            println!("Service state: {} ({})", active, file_state);
        }
        Err(e) => println!("Could not query service state: {}", e),
    }
    Ok(())
}

async fn service_state() -> Result<(String, String)> {
    let conn = Connection::system().await.context("dbus connect")?;
    let manager = manager_proxy(&conn).await?;
    let active = unit_active_state(&conn, &manager).await?;
    let (file_state,): (String,) = manager
        .call("GetUnitFileState", &(UNIT_NAME))
        .await
        .context("query unit file state")?;
    Ok((active, file_state))
}
