//! Default path resolution for configuration files
//!
//! Uses XDG Base Directory specification when available, with sensible fallbacks.

use std::path::PathBuf;

/// Default root under which board registers are exposed
pub const DEFAULT_REGISTER_ROOT: &str = "/sys/bus/platform/devices/switch-cpld";

/// Returns the default path for the static configuration file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/sfpmon/config.toml`
/// - Fallback: `/etc/sfpmon/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("sfpmon")
        .join("config.toml")
}

/// Returns the default register root.
pub fn default_register_root() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTER_ROOT)
}
