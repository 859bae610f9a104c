//! sfpmon Core Library
//!
//! Shared types, board layouts, and configuration for the transceiver
//! presence monitor. This crate is used by both the hardware layer and the
//! daemon.

pub mod board;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use board::*;
pub use config::{
    default_config_path, default_register_root, BoardSection, EventConfig, MonitorConfig,
    RegisterConfig, RetryConfig, StaticConfig,
};
pub use error::*;
pub use types::*;
