//! Tunables for the guard, activity windows and list defaults.
//!
//! Read from a TOML file; every key is optional and falls back to the
//! values the extension shipped with.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub guard: GuardConfig,
    pub activity: ActivityConfig,
    pub lists: ListsConfig,
}

impl CoreConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("Config: {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Windows used by the duplicate-add guard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// How long a finished signature stays in the in-flight set
    pub in_flight_linger_ms: u64,
    /// Any signature accepted within this window is refused
    pub throttle_window_ms: u64,
    /// A persisted record younger than this with the same signature is a duplicate
    pub recent_duplicate_window_ms: u64,
    /// Number of most recent records inspected by the persisted scan
    pub recent_scan_limit: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            in_flight_linger_ms: 1200,
            throttle_window_ms: 1500,
            recent_duplicate_window_ms: 2000,
            recent_scan_limit: 20,
        }
    }
}

impl GuardConfig {
    pub fn in_flight_linger(&self) -> Duration {
        millis(self.in_flight_linger_ms)
    }

    pub fn throttle_window(&self) -> Duration {
        millis(self.throttle_window_ms)
    }

    pub fn recent_duplicate_window(&self) -> Duration {
        millis(self.recent_duplicate_window_ms)
    }
}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Trailing window scanned for the longest streak
    pub longest_window_days: u32,
    /// Trailing window summed for "this week"
    pub week_days: u32,
    pub heatmap_days: u32,
    pub recent_sessions: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            longest_window_days: 365,
            week_days: 7,
            heatmap_days: 28,
            recent_sessions: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    pub default_color: String,
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            default_color: "#6366f1".to_string(),
        }
    }
}
