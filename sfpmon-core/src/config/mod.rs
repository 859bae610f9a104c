//! Configuration types for sfpmon
//!
//! [`StaticConfig`] holds the monitor cadence, register root, board
//! selection, retry policy, and event output settings. It is read once at
//! startup from a TOML file.

mod paths;
mod static_config;

pub use paths::{default_config_path, default_register_root, DEFAULT_REGISTER_ROOT};
pub use static_config::{
    BoardSection, EventConfig, MonitorConfig, RegisterConfig, RetryConfig, StaticConfig,
};
