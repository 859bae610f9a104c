//! Error types for transceiver presence monitoring

use thiserror::Error;

/// Core error type for sfpmon operations
#[derive(Error, Debug)]
pub enum SfpMonError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Port index out of range
    #[error("Port out of range: {port} (must be 1-{max})")]
    InvalidPort { port: usize, max: usize },

    /// Register contents could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Register values do not cover the board's ports
    #[error("Decode error: {0}")]
    Decode(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Register device node missing
    #[error("Register not found: {0}")]
    DeviceNotFound(String),

    /// Register exists but is not accessible
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A written value did not read back as expected
    #[error("Write verification failed for {path}: wrote '{expected}', read back '{actual}'")]
    WriteVerification {
        path: String,
        expected: String,
        actual: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SfpMonError {
    /// Whether the failure is a register access problem that a later poll
    /// cycle may not hit again.
    ///
    /// Layout and input errors are permanent: retrying the same poll with
    /// the same board description fails the same way.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SfpMonError::Io(_)
                | SfpMonError::DeviceNotFound(_)
                | SfpMonError::PermissionDenied(_)
                | SfpMonError::WriteVerification { .. }
                | SfpMonError::Parse(_)
        )
    }
}

/// Result type alias for sfpmon operations
pub type Result<T> = std::result::Result<T, SfpMonError>;

impl From<serde_json::Error> for SfpMonError {
    fn from(err: serde_json::Error) -> Self {
        SfpMonError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SfpMonError {
    fn from(err: toml::de::Error) -> Self {
        SfpMonError::Config(err.to_string())
    }
}
