//! sfpmon-hardware
//!
//! Hardware-facing crate that contains register access and the transceiver
//! presence monitor built on top of it. The daemon uses it to watch module
//! insertions and removals.
//
//! Public API:
//! - `register_source::RegisterSource` — register read/write abstraction
//! - `register_source::SysfsRegisterSource` — file-backed registers under a device root
//! - `mock::MockRegisterSource` — in-memory registers for tests and mock mode
//! - `decoder::PresenceDecoder` — presence bitfield decoding
//! - `reset_tracker::ResetHandshakeTracker` — reset handshake suppression
//! - `hooks::TransitionHook` — per-board side effects on transitions
//! - `monitor::TransceiverMonitor` — change detection with timeout semantics

pub mod decoder;
pub mod hooks;
pub mod mock;
pub mod monitor;
pub mod register_source;
pub mod reset_tracker;

pub use decoder::PresenceDecoder;
pub use hooks::{hooks_for, TransitionHook, TxEnableHook};
pub use mock::MockRegisterSource;
pub use monitor::{MonitorTiming, TransceiverMonitor};
pub use register_source::{RegisterSource, SysfsRegisterSource};
pub use reset_tracker::ResetHandshakeTracker;
