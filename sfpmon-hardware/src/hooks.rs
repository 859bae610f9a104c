//! Board-specific side effects on presence transitions
//!
//! The diff loop in the monitor is the same for every board. Wiring that
//! only some boards have, such as a transmit-enable line that has to follow
//! module presence, is plugged in as a [`TransitionHook`].

use async_trait::async_trait;
use sfpmon_core::{BoardLayout, PortIndex, PresenceChange, Result, TxEnableLayout};
use tracing::{debug, info};

use crate::register_source::RegisterSource;

/// Per-board reaction to the monitor's lifecycle
#[async_trait]
pub trait TransitionHook: Send + Sync {
    /// Short name for log messages
    fn name(&self) -> &'static str;

    /// Called once with the baseline snapshot after the monitor initializes
    async fn on_initialized(&self, _source: &dyn RegisterSource, _snapshot: &[bool]) -> Result<()> {
        Ok(())
    }

    /// Called for every port whose presence flipped during a poll
    async fn on_transition(
        &self,
        source: &dyn RegisterSource,
        port: PortIndex,
        change: PresenceChange,
    ) -> Result<()>;
}

/// Drives a transmit-enable register to match module presence
///
/// Only the ports listed in the layout are touched. With `enable_on_init`,
/// ports already present at startup get their transmitter enabled, since
/// the board powers up with the line disabled.
pub struct TxEnableHook {
    layout: TxEnableLayout,
}

impl TxEnableHook {
    pub fn new(layout: TxEnableLayout) -> Self {
        Self { layout }
    }

    fn handles(&self, port: PortIndex) -> bool {
        self.layout.ports.contains(&port)
    }

    async fn set_tx(&self, source: &dyn RegisterSource, port: PortIndex, enable: bool) -> Result<()> {
        let path = BoardLayout::register_path(&self.layout.register, port);
        let value = if enable {
            &self.layout.enable_value
        } else {
            &self.layout.disable_value
        };
        source.write(&path, value).await
    }
}

#[async_trait]
impl TransitionHook for TxEnableHook {
    fn name(&self) -> &'static str {
        "tx-enable"
    }

    async fn on_initialized(&self, source: &dyn RegisterSource, snapshot: &[bool]) -> Result<()> {
        if !self.layout.enable_on_init {
            return Ok(());
        }

        for &port in &self.layout.ports {
            let present = port
                .checked_sub(1)
                .and_then(|i| snapshot.get(i).copied())
                .unwrap_or(false);
            if present {
                info!("Port {}: enabling transmit for module present at boot", port);
                self.set_tx(source, port, true).await?;
            }
        }
        Ok(())
    }

    async fn on_transition(
        &self,
        source: &dyn RegisterSource,
        port: PortIndex,
        change: PresenceChange,
    ) -> Result<()> {
        if !self.handles(port) {
            return Ok(());
        }

        debug!(
            "Port {}: {} transmit",
            port,
            if change.is_present() { "enabling" } else { "disabling" }
        );
        self.set_tx(source, port, change.is_present()).await
    }
}

/// Build the hooks a board's layout calls for
pub fn hooks_for(layout: &BoardLayout) -> Vec<Box<dyn TransitionHook>> {
    let mut hooks: Vec<Box<dyn TransitionHook>> = Vec::new();
    if let Some(tx) = &layout.tx_enable {
        hooks.push(Box::new(TxEnableHook::new(tx.clone())));
    }
    hooks
}
