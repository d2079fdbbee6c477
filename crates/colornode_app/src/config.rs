// SPDX-License-Identifier: MIT OR Apache-2.0
//! Driver configuration.
//!
//! Loaded from a RON file given on the command line; every field has a
//! default so a partial file is fine.

use colornode_graph::EditorSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Frame driver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Format version
    pub version: u32,
    /// Number of frames to run
    pub frames: u64,
    /// Pause between frames in milliseconds
    pub frame_interval_ms: u64,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Editor session settings
    pub editor: EditorSettings,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            frames: 120,
            frame_interval_ms: 16,
            log_filter: "colornode_app=info,colornode_graph=info".to_string(),
            editor: EditorSettings::default(),
        }
    }
}

impl DriverConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a configuration string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Check values a driver cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.frames == 0 {
            return Err(ConfigError::Invalid("frames must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Pause between frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Error loading the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Config version {0} is newer than supported version {max}", max = CONFIG_FORMAT_VERSION)]
    UnsupportedVersion(u32),

    /// A value is out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}
