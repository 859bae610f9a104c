//! In-memory register source for tests and `--mock` mode.

use async_trait::async_trait;
use sfpmon_core::{Result, SfpMonError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::register_source::RegisterSource;

/// Mock register source holding register values in memory.
///
/// Writes update the stored value, so a handshake write-back is visible to
/// the next read. Every read and write is logged for assertions.
#[derive(Default)]
pub struct MockRegisterSource {
    values: Mutex<HashMap<String, String>>,
    /// Captured writes as `(path, value)`.
    write_log: Mutex<Vec<(String, String)>>,
    /// Captured read paths.
    read_log: Mutex<Vec<String>>,
    /// Paths whose reads fail with an I/O error.
    failing: Mutex<HashSet<String>>,
    /// Paths whose writes fail with an I/O error.
    failing_writes: Mutex<HashSet<String>>,
}

impl MockRegisterSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value.
    pub fn set(&self, path: &str, value: impl Into<String>) {
        self.values
            .lock()
            .unwrap()
            .insert(path.to_string(), value.into());
    }

    /// Current register value, if any.
    pub fn get(&self, path: &str) -> Option<String> {
        self.values.lock().unwrap().get(path).cloned()
    }

    /// Get all captured writes.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.write_log.lock().unwrap().clone()
    }

    /// Captured writes to one register.
    pub fn writes_to(&self, path: &str) -> Vec<String> {
        self.write_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Get all captured reads.
    pub fn reads(&self) -> Vec<String> {
        self.read_log.lock().unwrap().clone()
    }

    /// Clear captured reads.
    pub fn clear_reads(&self) {
        self.read_log.lock().unwrap().clear();
    }

    /// Make reads of `path` fail until [`MockRegisterSource::restore`] is called.
    pub fn fail_reads(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    /// Make writes to `path` fail until [`MockRegisterSource::restore`] is called.
    ///
    /// Failed writes are not captured and leave the value unchanged.
    pub fn fail_writes(&self, path: &str) {
        self.failing_writes.lock().unwrap().insert(path.to_string());
    }

    /// Undo [`MockRegisterSource::fail_reads`] and [`MockRegisterSource::fail_writes`].
    pub fn restore(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
        self.failing_writes.lock().unwrap().remove(path);
    }
}

#[async_trait]
impl RegisterSource for MockRegisterSource {
    async fn read(&self, path: &str) -> Result<String> {
        self.read_log.lock().unwrap().push(path.to_string());

        if self.failing.lock().unwrap().contains(path) {
            return Err(SfpMonError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("injected read failure on {}", path),
            )));
        }

        self.values
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| SfpMonError::DeviceNotFound(path.to_string()))
    }

    async fn write(&self, path: &str, value: &str) -> Result<()> {
        if self.failing_writes.lock().unwrap().contains(path) {
            return Err(SfpMonError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("injected write failure on {}", path),
            )));
        }

        self.write_log
            .lock()
            .unwrap()
            .push((path.to_string(), value.to_string()));
        self.values
            .lock()
            .unwrap()
            .insert(path.to_string(), value.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
