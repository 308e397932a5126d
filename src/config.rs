// SPDX-License-Identifier: GPL-3.0-only

//! Scanner configuration
//!
//! Persisted as JSON under the user's config directory. Missing or
//! unreadable files fall back to defaults; unknown timing values are
//! taken at face value, they are tuning knobs, not invariants.

use crate::constants::timing;
use crate::errors::{AppError, AppResult};
use crate::session::FacingMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred camera facing at startup
    pub facing: FacingMode,
    /// Frame sampling cadence in milliseconds
    pub sample_interval_ms: u64,
    /// Debounce window for decode results in milliseconds
    pub result_debounce_ms: u64,
    /// Debounce before restarting the stream after a resize
    pub resize_debounce_ms: u64,
    /// Copy decoded text to the system clipboard
    pub copy_to_clipboard: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facing: FacingMode::default(),
            sample_interval_ms: timing::SAMPLE_INTERVAL.as_millis() as u64,
            result_debounce_ms: timing::RESULT_DEBOUNCE.as_millis() as u64,
            resize_debounce_ms: timing::RESIZE_RESTART_DEBOUNCE.as_millis() as u64,
            copy_to_clipboard: true,
        }
    }
}

impl Config {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn result_debounce(&self) -> Duration {
        Duration::from_millis(self.result_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Location of the config file, when a config directory exists
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qrsnap").join("config.json"))
    }

    /// Load from disk, falling back to defaults on any failure
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write the config to disk
    pub fn save(&self) -> AppResult<()> {
        let path =
            Self::path().ok_or_else(|| AppError::Config("no config directory".to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("{}: {}", parent.display(), e)))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.sample_interval(), timing::SAMPLE_INTERVAL);
        assert_eq!(config.result_debounce(), timing::RESULT_DEBOUNCE);
        assert_eq!(config.resize_debounce(), timing::RESIZE_RESTART_DEBOUNCE);
        assert!(config.copy_to_clipboard);
        assert_eq!(config.facing, FacingMode::User);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::default();
        config.facing = FacingMode::Environment;
        config.sample_interval_ms = 100;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed: Config = serde_json::from_str(r#"{"sample_interval_ms": 125}"#).unwrap();
        assert_eq!(parsed.sample_interval_ms, 125);
        assert_eq!(parsed.result_debounce_ms, 500);
    }
}
