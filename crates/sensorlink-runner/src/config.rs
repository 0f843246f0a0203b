//! Runner configuration, loaded from YAML.
//!
//! ```yaml
//! chunk_size: 64
//! engine:
//!   max_buffered_bytes: 65536
//! uart:
//!   baud_rate: 57600
//!   parity: even
//! ```

use std::path::Path;

use sensorlink_engine::EngineConfig;
use sensorlink_protocol::UartSettings;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default replay chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Top-level runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Engine settings.
    pub engine: EngineConfig,
    /// UART settings used by `encode reconfigure` when no flags are given.
    pub uart: UartSettings,
    /// Bytes per delivery when replaying a capture.
    pub chunk_size: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            engine: EngineConfig::default(),
            uart: UartSettings::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl RunnerConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}
