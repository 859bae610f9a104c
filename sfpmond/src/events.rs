//! Transceiver events published by the daemon
//!
//! Each transition reported by the monitor becomes one [`TransceiverEvent`].
//! Sinks decide where events go: the log always, and optionally stdout as
//! JSON lines for downstream consumers.

use serde::{Deserialize, Serialize};
use sfpmon_core::{PortIndex, PresenceChange, Result};
use std::fmt;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// What happened to a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Module present when the daemon started
    Present,
    /// Module inserted
    Inserted,
    /// Module removed
    Removed,
}

impl From<PresenceChange> for EventKind {
    fn from(change: PresenceChange) -> Self {
        match change {
            PresenceChange::Inserted => EventKind::Inserted,
            PresenceChange::Removed => EventKind::Removed,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Present => write!(f, "present"),
            EventKind::Inserted => write!(f, "inserted"),
            EventKind::Removed => write!(f, "removed"),
        }
    }
}

/// One presence event for one port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransceiverEvent {
    pub port: PortIndex,
    pub kind: EventKind,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl TransceiverEvent {
    pub fn new(port: PortIndex, kind: EventKind) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            port,
            kind,
            timestamp_ms,
        }
    }
}

/// Destination for transceiver events
pub trait EventSink: Send {
    fn publish(&mut self, event: &TransceiverEvent) -> Result<()>;
}

/// Logs every event through tracing
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&mut self, event: &TransceiverEvent) -> Result<()> {
        info!(port = event.port, kind = %event.kind, "Port {}: transceiver {}", event.port, event.kind);
        Ok(())
    }
}

/// Writes every event as one JSON object per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn publish(&mut self, event: &TransceiverEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
