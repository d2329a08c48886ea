//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hyprnotch/config.json`.
//! Every key is optional and unknown keys are ignored, so a minimal `{}`
//! file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "selected_monitors": ["DP-1", "HDMI-A-1"],
//!   "socket_path": "/run/user/1000/hyprnotch.sock",
//!   "poll_interval_ms": 50,
//!   "listener": {
//!     "channel_capacity": 64,
//!     "stop_timeout_ms": 1000
//!   },
//!   "monitor_query": {
//!     "program": "hyprctl",
//!     "args": ["monitors", "-j"]
//!   }
//! }
//! ```

use crate::hyprland::events::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_STOP_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitors that receive UI instances.  Empty means all of them; if
    /// none of the names exist, all monitors are used as well.
    pub selected_monitors: Vec<String>,
    /// Shortcut socket; defaults to `$XDG_RUNTIME_DIR/hyprnotch.sock`.
    pub socket_path: Option<PathBuf>,
    /// How often the UI loop drains focus events (ms).
    pub poll_interval_ms: u64,
    pub listener: ListenerConfig,
    pub monitor_query: MonitorQueryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selected_monitors: Vec::new(),
            socket_path: None,
            poll_interval_ms: 50,
            listener: ListenerConfig::default(),
            monitor_query: MonitorQueryConfig::default(),
        }
    }
}

/// Focus event listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bound of the listener → UI channel.
    pub channel_capacity: usize,
    /// How long `stop_listening` waits for the reader thread (ms).
    pub stop_timeout_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ListenerConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

/// The command printing the monitor list as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorQueryConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for MonitorQueryConfig {
    fn default() -> Self {
        Self {
            program: "hyprctl".into(),
            args: vec!["monitors".into(), "-j".into()],
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// The configured shortcut socket, or the default one.
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path.clone().unwrap_or_else(default_socket_path)
    }
}

/// `$XDG_RUNTIME_DIR/hyprnotch.sock`, or `/tmp/hyprnotch.sock`.
pub fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("hyprnotch.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprnotch`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hyprnotch")
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
