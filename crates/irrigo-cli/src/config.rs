//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use irrigo_store::{DEFAULT_EVENT_CHUNK_SIZE, DEFAULT_MAX_EVENT_PAYLOAD, StationSettings};
use serde::{Deserialize, Serialize};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the log tree
    #[serde(default)]
    pub log_root: Option<PathBuf>,

    /// Largest notifier chunk of a system event, in bytes
    #[serde(default = "default_event_chunk_size")]
    pub event_chunk_size: usize,

    /// Staging buffer size for system event delivery, in bytes
    #[serde(default = "default_max_event_payload")]
    pub max_event_payload: usize,

    /// Zones, flow rates and running water counters
    #[serde(default)]
    pub station: StationSettings,
}

fn default_event_chunk_size() -> usize {
    DEFAULT_EVENT_CHUNK_SIZE
}

fn default_max_event_payload() -> usize {
    DEFAULT_MAX_EVENT_PAYLOAD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_root: None,
            event_chunk_size: default_event_chunk_size(),
            max_event_payload: default_max_event_payload(),
            station: StationSettings::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("irrigo")
            .join("config.toml")
    }

    /// Load config from `path`, or return the default if it does not exist.
    /// A file that exists but cannot be read or parsed is an error, so a
    /// broken config never has its counters overwritten.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Log root: explicit override, then config, then the platform default.
    pub fn resolve_log_root(&self, cli_root: Option<&Path>) -> PathBuf {
        cli_root
            .map(Path::to_path_buf)
            .or_else(|| self.log_root.clone())
            .unwrap_or_else(irrigo_store::default_log_root)
    }
}
