//! Reset handshake tracking
//!
//! Some boards pulse a module's reset line behind a per-port handshake
//! register. While a reset is in flight the module must be reported absent
//! even though its presence bit is still asserted. The tracker reads the
//! phase for every candidate-present port and advances the handshake by
//! writing back to the hardware:
//!
//! | phase read        | reported presence | write-back          |
//! |-------------------|-------------------|---------------------|
//! | `None`            | present           | -                   |
//! | `ResetRequested`  | absent            | `Resetting` (ack)   |
//! | `Resetting`       | absent            | -                   |
//! | `ResetDone`       | present           | `None` (re-arm)     |
//!
//! No phase is kept in process memory; the hardware register is the only
//! record, so a restarted monitor resumes from whatever phase it finds.

use sfpmon_core::{parse_register_value, BoardLayout, PortIndex, ResetPhase, Result};
use tracing::{debug, info};

use crate::register_source::RegisterSource;

/// Applies the reset handshake to decoded presence
#[derive(Debug, Clone)]
pub struct ResetHandshakeTracker {
    ports: Vec<PortIndex>,
    phase_register: String,
}

impl ResetHandshakeTracker {
    /// Build the tracker for a board, or `None` if it has no handshake
    pub fn from_layout(layout: &BoardLayout) -> Option<Self> {
        layout.reset_handshake.as_ref().map(|reset| {
            let mut ports = reset.ports.clone();
            ports.sort_unstable();
            ports.dedup();
            Self {
                ports,
                phase_register: reset.phase_register.clone(),
            }
        })
    }

    fn phase_path(&self, port: PortIndex) -> String {
        BoardLayout::register_path(&self.phase_register, port)
    }

    /// Read the current reset phase of one port
    pub async fn read_phase(&self, source: &dyn RegisterSource, port: PortIndex) -> Result<ResetPhase> {
        let raw = source.read(&self.phase_path(port)).await?;
        ResetPhase::from_code(parse_register_value(&raw)?)
    }

    /// Override `states` for ports mid-reset and drive the handshake forward
    ///
    /// `states` is indexed by `port - 1`. Ports currently decoded absent are
    /// skipped without touching their phase register.
    pub async fn apply(&self, source: &dyn RegisterSource, states: &mut [bool]) -> Result<()> {
        for &port in &self.ports {
            let Some(state) = port.checked_sub(1).and_then(|i| states.get_mut(i)) else {
                continue;
            };
            if !*state {
                continue;
            }

            let phase = self.read_phase(source, port).await?;
            if phase.suppresses_presence() {
                *state = false;
            }

            match phase {
                ResetPhase::None => {}
                ResetPhase::ResetRequested => {
                    info!("Port {}: reset requested, acknowledging", port);
                    source
                        .write(
                            &self.phase_path(port),
                            &ResetPhase::Resetting.code().to_string(),
                        )
                        .await?;
                }
                ResetPhase::Resetting => {
                    debug!("Port {}: reset in progress", port);
                }
                ResetPhase::ResetDone => {
                    info!("Port {}: reset complete, re-arming handshake", port);
                    source
                        .write(&self.phase_path(port), &ResetPhase::None.code().to_string())
                        .await?;
                }
            }
        }

        Ok(())
    }
}
