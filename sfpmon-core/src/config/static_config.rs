//! Static configuration loaded once at startup
//!
//! This configuration is read-only after the daemon starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::default_register_root;
use crate::{BoardLayout, BoardType, Result, SfpMonError};

/// Polling cadence of the transceiver monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Wait before the first poll after startup, in milliseconds
    pub settle_delay_ms: u64,
    /// Interval between polls while waiting for a change, in milliseconds
    pub poll_interval_ms: u64,
    /// Timeout handed to each `check_status` call (0 blocks until a change)
    pub check_timeout_ms: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 5000,
            poll_interval_ms: 1000,
            check_timeout_ms: 0,
        }
    }
}

impl MonitorConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Register source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// Directory under which register paths are resolved
    pub root: PathBuf,
    /// Re-read every written register to confirm the value stuck
    pub verify_writes: bool,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            root: default_register_root(),
            verify_writes: false,
        }
    }
}

/// Board selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSection {
    /// Preset name
    #[serde(rename = "type")]
    pub board_type: BoardType,
    /// Explicit layout, required for `custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<BoardLayout>,
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            board_type: BoardType::Qsfp32Sfp2,
            layout: None,
        }
    }
}

impl BoardSection {
    /// Resolve the board layout this section selects
    ///
    /// An explicit layout always wins; otherwise the preset's built-in
    /// layout is used. The result is validated before it is returned.
    pub fn resolve(&self) -> Result<BoardLayout> {
        let layout = match &self.layout {
            Some(layout) => layout.clone(),
            None => self.board_type.to_layout()?,
        };
        layout.validate()?;
        Ok(layout)
    }
}

/// Backoff applied by the event consumer when a poll fails
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay after the first failure, in seconds
    pub initial_delay_secs: u64,
    /// Upper bound on the delay, in seconds
    pub max_delay_secs: u64,
    /// Multiplier applied after each consecutive failure
    pub backoff_multiplier: f64,
    /// Give up after this many consecutive failures (0 = never)
    pub max_consecutive_failures: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 1,
            max_delay_secs: 30,
            backoff_multiplier: 2.0,
            max_consecutive_failures: 0,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after `failures` consecutive failures (1-based)
    ///
    /// ```
    /// use sfpmon_core::RetryConfig;
    /// use std::time::Duration;
    ///
    /// let retry = RetryConfig::default();
    /// assert_eq!(retry.delay_for(1), Duration::from_secs(1));
    /// assert_eq!(retry.delay_for(3), Duration::from_secs(4));
    /// assert_eq!(retry.delay_for(20), Duration::from_secs(30));
    /// ```
    pub fn delay_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(64) as i32;
        let secs = self.initial_delay_secs as f64 * self.backoff_multiplier.powi(exponent);
        let max = Duration::from_secs(self.max_delay_secs);
        Duration::try_from_secs_f64(secs.max(0.0))
            .map(|delay| delay.min(max))
            .unwrap_or(max)
    }
}

/// Event publication settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Also write each event to stdout as a JSON line
    pub json: bool,
}

/// Static configuration for the sfpmon daemon.
///
/// This is loaded once at startup and remains immutable during runtime.
/// Located at `~/.config/sfpmon/config.toml` by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub registers: RegisterConfig,

    #[serde(default)]
    pub board: BoardSection,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub events: EventConfig,
}

impl StaticConfig {
    /// Parse StaticConfig from TOML string.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize StaticConfig to TOML string.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load the configuration file, falling back to defaults when it is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SfpMonError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(Self::from_toml(&content)?)
    }
}
