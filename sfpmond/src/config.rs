//! Runtime settings for the daemon
//!
//! Merges the static configuration file with command-line overrides and
//! resolves the board layout the monitor will run against.

use sfpmon_core::{
    BoardLayout, BoardType, MonitorConfig, RegisterConfig, Result, RetryConfig, StaticConfig,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub board: Option<BoardType>,
    pub root: Option<PathBuf>,
    pub check_timeout_ms: Option<i64>,
    pub json: bool,
    pub mock: bool,
}

/// Fully resolved daemon settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub layout: BoardLayout,
    pub registers: RegisterConfig,
    pub monitor: MonitorConfig,
    pub retry: RetryConfig,
    pub json_events: bool,
    pub mock: bool,
}

impl Settings {
    /// Load the config file at `path` and apply `overrides`
    ///
    /// A missing file yields the built-in defaults.
    pub fn load(path: &Path, overrides: &Overrides) -> Result<Self> {
        let config = StaticConfig::load(path)?;
        Self::resolve(config, overrides)
    }

    /// Apply overrides to `config` and resolve the board layout
    ///
    /// A `--board` preset replaces the configured board, including any
    /// explicit layout; `--board custom` keeps the configured layout.
    pub fn resolve(mut config: StaticConfig, overrides: &Overrides) -> Result<Self> {
        if let Some(board) = overrides.board {
            if board != BoardType::Custom {
                config.board.layout = None;
            }
            config.board.board_type = board;
        }

        if let Some(root) = &overrides.root {
            config.registers.root = root.clone();
        }

        if let Some(timeout) = overrides.check_timeout_ms {
            config.monitor.check_timeout_ms = timeout;
        }

        let layout = config.board.resolve()?;
        debug!(
            "Resolved board '{}' ({} ports) under {}",
            layout.name,
            layout.port_count,
            config.registers.root.display()
        );

        Ok(Self {
            layout,
            registers: config.registers,
            monitor: config.monitor,
            retry: config.retry,
            json_events: config.events.json || overrides.json,
            mock: overrides.mock,
        })
    }
}
