//! Register access for board CPLD/FPGA registers
//!
//! Registers are exposed as small text files (sysfs attributes) holding a
//! decimal or hexadecimal value. [`RegisterSource`] abstracts that access so
//! the monitor can run against real hardware or an in-memory mock.

use async_trait::async_trait;
use sfpmon_core::{parse_register_value, Result, SfpMonError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Trait for register access abstraction
///
/// This trait enables testing of the monitor without real hardware by
/// allowing mock implementations.
#[async_trait]
pub trait RegisterSource: Send + Sync {
    /// Read the raw text value of a register
    async fn read(&self, path: &str) -> Result<String>;

    /// Write a raw text value to a register
    async fn write(&self, path: &str, value: &str) -> Result<()>;

    /// Short description for log messages
    fn describe(&self) -> String;
}

/// Register source backed by files under a device root, e.g. a sysfs node
pub struct SysfsRegisterSource {
    root: PathBuf,
    verify_writes: bool,
}

impl SysfsRegisterSource {
    /// Create a new sysfs register source
    ///
    /// # Arguments
    /// * `root` - Directory that register paths are resolved against
    /// * `verify_writes` - Re-read each written register to confirm the value
    pub fn new(root: impl Into<PathBuf>, verify_writes: bool) -> Self {
        Self {
            root: root.into(),
            verify_writes,
        }
    }

    /// Absolute path of a register
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

/// Map an I/O failure on `path` onto the register error taxonomy
fn map_io_error(path: &Path, err: std::io::Error) -> SfpMonError {
    match err.kind() {
        std::io::ErrorKind::NotFound => SfpMonError::DeviceNotFound(path.display().to_string()),
        std::io::ErrorKind::PermissionDenied => {
            SfpMonError::PermissionDenied(path.display().to_string())
        }
        _ => SfpMonError::Io(err),
    }
}

/// Compare a written value with what the register reads back
///
/// Numeric values compare by value so `0x2` matches `2`; anything else
/// compares as trimmed text.
fn values_match(expected: &str, actual: &str) -> bool {
    match (parse_register_value(expected), parse_register_value(actual)) {
        (Ok(a), Ok(b)) => a == b,
        _ => expected.trim() == actual.trim(),
    }
}

#[async_trait]
impl RegisterSource for SysfsRegisterSource {
    async fn read(&self, path: &str) -> Result<String> {
        let full_path = self.resolve(path);
        let value = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| map_io_error(&full_path, e))?;

        debug!("RD {} = {:?}", full_path.display(), value.trim());
        Ok(value)
    }

    async fn write(&self, path: &str, value: &str) -> Result<()> {
        let full_path = self.resolve(path);
        debug!("WR {} <- {:?}", full_path.display(), value);

        tokio::fs::write(&full_path, value)
            .await
            .map_err(|e| map_io_error(&full_path, e))?;

        if self.verify_writes {
            let actual = self.read(path).await?;
            if !values_match(value, &actual) {
                warn!(
                    "Register {} did not hold written value {:?}",
                    full_path.display(),
                    value
                );
                return Err(SfpMonError::WriteVerification {
                    path: full_path.display().to_string(),
                    expected: value.to_string(),
                    actual: actual.trim().to_string(),
                });
            }
        }

        Ok(())
    }

    fn describe(&self) -> String {
        format!("sysfs:{}", self.root.display())
    }
}
