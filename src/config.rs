//! Configuration for the remote-control server.
//!
//! The host owns its startup configuration; this type is what it hands to
//! [`crate::RemoteServer::new`]. Values may come from defaults, a JSON file,
//! or `REMOTE_CONTROL_*` environment variables (applied last).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::constants;

/// Remote-control server configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Whether the server should listen at all.
    pub enabled: bool,
    /// Unix socket path the server binds.
    pub socket_path: PathBuf,
    /// Minimum milliseconds between accept attempts while idle.
    pub accept_interval_ms: u64,
    /// Screenshot destination used when a request carries no `path`.
    pub screenshot_path: PathBuf,
    /// Per-session receive buffer capacity in bytes.
    pub rx_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: false,
            socket_path: PathBuf::from(constants::DEFAULT_SOCKET_PATH),
            accept_interval_ms: constants::ACCEPT_POLL_INTERVAL.as_millis() as u64,
            screenshot_path: PathBuf::from(constants::DEFAULT_SCREENSHOT_PATH),
            rx_capacity: constants::RX_BUFFER_CAPACITY,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Loads a JSON configuration file, then applies environment overrides.
    ///
    /// Missing keys fall back to their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config JSON: {}", path.display()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies `REMOTE_CONTROL_*` environment variables on top of `self`.
    ///
    /// Unparseable numeric values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(enabled) = std::env::var("REMOTE_CONTROL_ENABLED") {
            self.enabled = matches!(enabled.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(socket) = std::env::var("REMOTE_CONTROL_SOCKET") {
            if !socket.is_empty() {
                self.socket_path = PathBuf::from(socket);
            }
        }

        if let Ok(interval) = std::env::var("REMOTE_CONTROL_ACCEPT_INTERVAL_MS") {
            if let Ok(ms) = interval.parse::<u64>() {
                self.accept_interval_ms = ms;
            }
        }

        if let Ok(path) = std::env::var("REMOTE_CONTROL_SCREENSHOT_PATH") {
            if !path.is_empty() {
                self.screenshot_path = PathBuf::from(path);
            }
        }
    }

    /// Accept throttle as a [`Duration`].
    pub fn accept_interval(&self) -> Duration {
        Duration::from_millis(self.accept_interval_ms)
    }
}
