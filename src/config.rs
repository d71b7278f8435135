//! Engine configuration.
//!
//! All timing constants of the sync protocol live here so tests can shrink
//! them and embedders can tune them.
//!
//! # Example
//!
//! ```toml
//! [sync]
//! block_window_ms = 30      # echo-suppression window after an outbound sync
//! scroll_debounce_ms = 16   # one animation frame
//! settle_delay_ms = 50      # wait after a content swap before re-enumerating
//! margin_percent = 10       # viewport shrink on each vertical edge
//! channel_buffer = 32       # bounded duplex queue depth per direction
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Root configuration file shape: a single `[sync]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    sync: SyncConfig,
}

/// Timing and capacity settings for one sync session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How long a lock suppresses echo events after an outbound sync.
    pub block_window_ms: u64,

    /// Debounce window for preview scroll events. One animation frame:
    /// the leading event fires immediately, the rest of the burst
    /// coalesces into a single trailing fire.
    pub scroll_debounce_ms: u64,

    /// Delay between a content replacement and re-enumeration, letting
    /// the new DOM settle before nodes are observed.
    pub settle_delay_ms: u64,

    /// Symmetric viewport shrink (percent per vertical edge) applied to
    /// the intersection observer, so barely-clipped nodes don't flicker
    /// in and out of visibility.
    pub margin_percent: u8,

    /// Depth of each direction of the duplex message queue.
    pub channel_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            block_window_ms: 30,
            scroll_debounce_ms: 16,
            settle_delay_ms: 50,
            margin_percent: 10,
            channel_buffer: 32,
        }
    }
}

impl SyncConfig {
    /// Parse from TOML, warning about unknown keys instead of failing on
    /// them (typos should not kill a session that has working defaults).
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let de = toml::de::Deserializer::new(input);
        let mut unknown = Vec::new();
        let file: ConfigFile = serde_ignored::deserialize(de, |path| {
            unknown.push(path.to_string());
        })?;
        for key in &unknown {
            crate::log!("config"; "unknown config key ignored: {}", key);
        }
        file.sync.validate()?;
        Ok(file.sync)
    }

    /// Reject settings that would make the protocol misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.margin_percent >= 50 {
            return Err(ConfigError::Validation(format!(
                "margin_percent must be below 50, got {}",
                self.margin_percent
            )));
        }
        if self.channel_buffer == 0 {
            return Err(ConfigError::Validation(
                "channel_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn block_window(&self) -> Duration {
        Duration::from_millis(self.block_window_ms)
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
