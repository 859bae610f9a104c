//! Core types and data structures for transceiver presence monitoring

use crate::{Result, SfpMonError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 1-based front-panel port number
pub type PortIndex = usize;

/// A single port's presence transition between two consecutive polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceChange {
    /// Port transitioned to present (code `'1'`)
    #[serde(rename = "1")]
    Inserted,
    /// Port transitioned to absent (code `'0'`)
    #[serde(rename = "0")]
    Removed,
}

impl PresenceChange {
    /// Build the change for a port that now reads `present`
    pub fn from_presence(present: bool) -> Self {
        if present {
            PresenceChange::Inserted
        } else {
            PresenceChange::Removed
        }
    }

    /// Single character code reported to consumers
    pub fn code(&self) -> char {
        match self {
            PresenceChange::Inserted => '1',
            PresenceChange::Removed => '0',
        }
    }

    /// Parse a change code back into a transition
    ///
    /// # Examples
    ///
    /// ```
    /// use sfpmon_core::PresenceChange;
    ///
    /// assert_eq!(PresenceChange::from_code('1').unwrap(), PresenceChange::Inserted);
    /// assert!(PresenceChange::from_code('x').is_err());
    /// ```
    pub fn from_code(code: char) -> Result<Self> {
        match code {
            '1' => Ok(PresenceChange::Inserted),
            '0' => Ok(PresenceChange::Removed),
            other => Err(SfpMonError::Parse(format!(
                "Unknown presence change code: {:?}",
                other
            ))),
        }
    }

    /// Presence state the port ended up in
    pub fn is_present(&self) -> bool {
        matches!(self, PresenceChange::Inserted)
    }
}

impl fmt::Display for PresenceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Ports whose presence flipped since the previous snapshot, keyed by port
pub type ChangeSet = BTreeMap<PortIndex, PresenceChange>;

/// Result of one `check_status` call
///
/// `found == true` with an empty change set means the window elapsed with
/// nothing to report. `found == false` means the request itself was
/// rejected (negative timeout or unusable deadline).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub found: bool,
    pub changes: ChangeSet,
}

impl PollOutcome {
    /// A poll that observed at least one transition
    pub fn changed(changes: ChangeSet) -> Self {
        Self {
            found: true,
            changes,
        }
    }

    /// The timeout elapsed without any transition
    pub fn timed_out() -> Self {
        Self {
            found: true,
            changes: ChangeSet::new(),
        }
    }

    /// The request was malformed and no poll was attempted
    pub fn rejected() -> Self {
        Self::default()
    }

    pub fn is_timeout(&self) -> bool {
        self.found && self.changes.is_empty()
    }
}

/// Per-port reset handshake phase as exposed by the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    /// No reset cycle in flight
    None = 0,
    /// Hardware asserted a reset and waits for acknowledgement
    ResetRequested = 1,
    /// Reset acknowledged, pulse in progress
    Resetting = 2,
    /// Hardware posted completion
    ResetDone = 3,
}

impl ResetPhase {
    /// Decode a phase register value
    pub fn from_code(code: u64) -> Result<Self> {
        match code {
            0 => Ok(ResetPhase::None),
            1 => Ok(ResetPhase::ResetRequested),
            2 => Ok(ResetPhase::Resetting),
            3 => Ok(ResetPhase::ResetDone),
            other => Err(SfpMonError::Parse(format!(
                "Unknown reset phase code: {}",
                other
            ))),
        }
    }

    /// Value written to or read from the phase register
    pub fn code(&self) -> u64 {
        *self as u64
    }

    /// Whether a port in this phase must be reported absent
    pub fn suppresses_presence(&self) -> bool {
        matches!(self, ResetPhase::ResetRequested | ResetPhase::Resetting)
    }
}

impl fmt::Display for ResetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetPhase::None => write!(f, "none"),
            ResetPhase::ResetRequested => write!(f, "reset-requested"),
            ResetPhase::Resetting => write!(f, "resetting"),
            ResetPhase::ResetDone => write!(f, "reset-done"),
        }
    }
}

/// Parse a register value written as ASCII decimal or `0x`-prefixed hex
///
/// # Examples
///
/// ```
/// use sfpmon_core::parse_register_value;
///
/// assert_eq!(parse_register_value("3\n").unwrap(), 3);
/// assert_eq!(parse_register_value("0x1f").unwrap(), 31);
/// assert!(parse_register_value("").is_err());
/// ```
pub fn parse_register_value(raw: &str) -> Result<u64> {
    let value = raw.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };

    parsed.map_err(|e| SfpMonError::Parse(format!("Invalid register value {:?}: {}", raw, e)))
}

/// Parse a hexadecimal register word, with or without a `0x` prefix
pub fn parse_hex_word(raw: &str) -> Result<u64> {
    let value = raw.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    u64::from_str_radix(digits, 16)
        .map_err(|e| SfpMonError::Parse(format!("Invalid hex word {:?}: {}", raw, e)))
}
