//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Lower bound on the refresh interval. A configured zero would turn the
/// render loop into a busy loop.
const MIN_REFRESH_MS: u64 = 100;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Display refresh interval in milliseconds
    #[serde(default = "default_refresh")]
    pub refresh: u64,

    /// LCD contrast (0-63)
    #[serde(default = "default_contrast")]
    pub contrast: u8,

    /// Backlight configuration
    #[serde(default)]
    pub backlight: BacklightConfig,

    /// File server status shown on the overview page
    #[serde(default)]
    pub copyparty: CopypartyConfig,

    /// Storage mounts shown on the storage page
    #[serde(default)]
    pub storage: StorageConfig,

    /// Network monitoring configuration
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Backlight color. Equal channel values give white at the chosen
/// brightness (255 full, 190 is roughly 75%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklightConfig {
    #[serde(default = "default_backlight_level")]
    pub r: u8,
    #[serde(default = "default_backlight_level")]
    pub g: u8,
    #[serde(default = "default_backlight_level")]
    pub b: u8,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            r: default_backlight_level(),
            g: default_backlight_level(),
            b: default_backlight_level(),
        }
    }
}

/// File server whose reachability the overview page reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopypartyConfig {
    /// systemd unit name
    #[serde(default = "default_copyparty_unit")]
    pub unit: String,

    /// Port advertised on the overview page when the server is up
    #[serde(default = "default_copyparty_port")]
    pub port: u16,
}

impl Default for CopypartyConfig {
    fn default() -> Self {
        Self {
            unit: default_copyparty_unit(),
            port: default_copyparty_port(),
        }
    }
}

/// Storage mounts on the storage page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Mount point of the secondary (NVMe) storage
    #[serde(default = "default_nvme_mount")]
    pub nvme_mount: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            nvme_mount: default_nvme_mount(),
        }
    }
}

/// Network monitoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    /// Interface to monitor (None = auto-detect the default route)
    #[serde(default)]
    pub interface: Option<String>,
}

// Default value functions
fn default_refresh() -> u64 {
    2000
}

fn default_contrast() -> u8 {
    40
}

fn default_backlight_level() -> u8 {
    190
}

fn default_copyparty_unit() -> String {
    "copyparty.service".to_string()
}

fn default_copyparty_port() -> u16 {
    8080
}

fn default_nvme_mount() -> String {
    "/mnt/storage".to_string()
}

impl Config {
    /// Loads configuration from a TOML file. A missing file is not an
    /// error; the built-in defaults apply.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        if self.refresh < MIN_REFRESH_MS {
            warn!(
                "Refresh interval {}ms below minimum, using {}ms",
                self.refresh, MIN_REFRESH_MS
            );
            self.refresh = MIN_REFRESH_MS;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh: default_refresh(),
            contrast: default_contrast(),
            backlight: BacklightConfig::default(),
            copyparty: CopypartyConfig::default(),
            storage: StorageConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.refresh, 2000);
        assert_eq!(config.backlight.r, 190);
        assert_eq!(config.copyparty.port, 8080);
        assert_eq!(config.storage.nvme_mount, "/mnt/storage");
        assert!(config.network.interface.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            refresh = 5000

            [copyparty]
            port = 3923
            "#,
        )
        .unwrap();
        assert_eq!(config.refresh, 5000);
        assert_eq!(config.copyparty.port, 3923);
        // Everything else falls back to defaults
        assert_eq!(config.contrast, 40);
        assert_eq!(config.copyparty.unit, "copyparty.service");
    }

    #[test]
    fn test_refresh_clamped_to_minimum() {
        let config: Config = toml::from_str("refresh = 0").unwrap();
        assert_eq!(config.sanitized().refresh, MIN_REFRESH_MS);

        let config: Config = toml::from_str("refresh = 2000").unwrap();
        assert_eq!(config.sanitized().refresh, 2000);
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = Config::load_or_default("/nonexistent/gfx-hat-stats.toml").unwrap();
        assert_eq!(config.refresh, 2000);
    }
}
