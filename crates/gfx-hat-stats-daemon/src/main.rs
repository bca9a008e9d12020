//! GFX HAT Stats Daemon
//!
//! Background service that renders system statistics on a Pimoroni GFX HAT
//! (128x64 ST7567 LCD with capacitive touch buttons and an RGB backlight).

mod config;
mod pages;
mod sensors;
mod state;

use anyhow::{anyhow, bail, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

/// Touch controller poll interval in milliseconds.
const TOUCH_POLL_MS: u64 = 50;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/gfx-hat-stats/config.toml".to_string());

    let config = Config::load_or_default(&config_path).context("Failed to load configuration")?;

    // Initialize application state, opening the display hardware
    let state = Arc::new(AppState::new(config)?);
    info!("GFX HAT initialized");

    // Start render and touch loops
    let mut render_task = tokio::spawn(render_loop(state.clone()));
    let mut touch_task = tokio::spawn(touch_loop(state.clone()));

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    // The loops run until cancelled; one of them completing means it died.
    let stopped_loop = tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
            None
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
            None
        }
        _ = &mut render_task => Some("render"),
        _ = &mut touch_task => Some("touch"),
    };

    state.shutdown();

    if let Some(name) = stopped_loop {
        bail!("{} loop stopped unexpectedly", name);
    }
    Ok(())
}

async fn render_loop(state: Arc<AppState>) {
    let mut consecutive_errors: u32 = 0;
    let mut last_error_log = std::time::Instant::now();

    loop {
        // Sampling and the frame write are blocking I/O (including a
        // blocking D-Bus query), so they run off the async workers.
        let frame_state = state.clone();
        let result = match tokio::task::spawn_blocking(move || frame_state.render_frame()).await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("render task panicked: {}", e)),
        };
        if let Err(e) = result {
            consecutive_errors += 1;
            // Only log errors once per minute or on first error
            let elapsed = last_error_log.elapsed();
            if consecutive_errors == 1 || elapsed >= std::time::Duration::from_secs(60) {
                if consecutive_errors > 1 {
                    warn!(
                        "Render error (repeated {} times in {:?}): {}",
                        consecutive_errors, elapsed, e
                    );
                } else {
                    warn!("Render error: {}", e);
                }
                last_error_log = std::time::Instant::now();
                consecutive_errors = 0;
            }
        } else {
            consecutive_errors = 0;
        }
        let ms = state.refresh_interval_ms();
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}

async fn touch_loop(state: Arc<AppState>) {
    let interval = std::time::Duration::from_millis(TOUCH_POLL_MS);
    let mut consecutive_errors: u32 = 0;
    let mut last_error_log = std::time::Instant::now();

    loop {
        tokio::time::sleep(interval).await;
        // A button press triggers a render, so this blocks like the
        // render path does and runs off the async workers too.
        let poll_state = state.clone();
        let result = match tokio::task::spawn_blocking(move || poll_state.poll_touch()).await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("touch task panicked: {}", e)),
        };
        if let Err(e) = result {
            consecutive_errors += 1;
            let elapsed = last_error_log.elapsed();
            if consecutive_errors == 1 || elapsed >= std::time::Duration::from_secs(60) {
                if consecutive_errors > 1 {
                    warn!(
                        "Touch poll error (repeated {} times in {:?}): {}",
                        consecutive_errors, elapsed, e
                    );
                } else {
                    warn!("Touch poll error: {}", e);
                }
                last_error_log = std::time::Instant::now();
                consecutive_errors = 0;
            }
        } else {
            consecutive_errors = 0;
        }
    }
}
