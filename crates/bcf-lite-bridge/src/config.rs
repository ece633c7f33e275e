// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration
//!
//! Read from `<config_dir>/bcf-lite/bridge.json` when present. Every field
//! is optional; missing ones take their default.

use bcf_lite_ipc::{DispatchOrder, DEFAULT_CONNECT_TIMEOUT};
use bcf_lite_viewpoint::{
    CodecOptions, DEFAULT_ORTHOGONAL_VIEW_NAME, DEFAULT_PERSPECTIVE_FIELD_OF_VIEW,
    DEFAULT_PERSPECTIVE_VIEW_NAME,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_DIR_NAME: &str = "bcf-lite";
const CONFIG_FILE_NAME: &str = "bridge.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(msg: impl Into<String>) -> Self {
        ConfigError::Invalid(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum deviation for a clipping plane to count as axis-aligned
    pub angle_threshold_rad: f64,
    pub dispatch_order: DispatchOrder,
    /// Degrees
    pub perspective_field_of_view: f64,
    pub orthogonal_view_name: String,
    pub perspective_view_name: String,
    pub include_snapshot: bool,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
    pub connect_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let codec = CodecOptions::default();
        Self {
            angle_threshold_rad: codec.angle_threshold_rad,
            dispatch_order: DispatchOrder::default(),
            perspective_field_of_view: DEFAULT_PERSPECTIVE_FIELD_OF_VIEW,
            orthogonal_view_name: DEFAULT_ORTHOGONAL_VIEW_NAME.to_string(),
            perspective_view_name: DEFAULT_PERSPECTIVE_VIEW_NAME.to_string(),
            include_snapshot: codec.include_snapshot,
            log_level: "info".to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl BridgeConfig {
    /// Standard configuration file location, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the standard location, falling back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.angle_threshold_rad > 0.0 && self.angle_threshold_rad < FRAC_PI_4) {
            return Err(ConfigError::invalid(format!(
                "angle_threshold_rad must be in (0, pi/4), got {}",
                self.angle_threshold_rad
            )));
        }
        if !(self.perspective_field_of_view > 0.0 && self.perspective_field_of_view < 180.0) {
            return Err(ConfigError::invalid(format!(
                "perspective_field_of_view must be in (0, 180), got {}",
                self.perspective_field_of_view
            )));
        }
        if self.orthogonal_view_name.trim().is_empty() || self.perspective_view_name.trim().is_empty()
        {
            return Err(ConfigError::invalid("scratch view names must not be empty"));
        }
        if self.orthogonal_view_name == self.perspective_view_name {
            return Err(ConfigError::invalid(
                "orthogonal and perspective scratch views must have different names",
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::invalid("connect_timeout_ms must be positive"));
        }
        Ok(())
    }

    /// Codec options derived from this configuration
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            angle_threshold_rad: self.angle_threshold_rad,
            perspective_field_of_view: self.perspective_field_of_view,
            orthogonal_view_name: self.orthogonal_view_name.clone(),
            perspective_view_name: self.perspective_view_name.clone(),
            include_snapshot: self.include_snapshot,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BridgeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.dispatch_order, DispatchOrder::Lifo);
        assert_eq!(config.codec_options(), CodecOptions::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"dispatch_order": "fifo", "log_level": "debug"}"#).unwrap();

        assert_eq!(config.dispatch_order, DispatchOrder::Fifo);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.perspective_field_of_view, 45.0);
    }

    #[test]
    fn test_rejects_wide_threshold() {
        let config = BridgeConfig {
            angle_threshold_rad: 1.0,
            ..BridgeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_same_view_names() {
        let config = BridgeConfig {
            perspective_view_name: DEFAULT_ORTHOGONAL_VIEW_NAME.to_string(),
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("bcf-lite-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"perspective_field_of_view": 60.0}"#).unwrap();

        let config = BridgeConfig::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.perspective_field_of_view, 60.0);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("bcf-lite-does-not-exist.json");
        assert!(matches!(
            BridgeConfig::load_from(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
