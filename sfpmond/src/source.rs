//! Register source selection
//!
//! Real hardware goes through the sysfs source; `--mock` runs against an
//! in-memory register map primed with every port empty.

use sfpmon_core::{BoardLayout, ResetPhase};
use sfpmon_hardware::{MockRegisterSource, RegisterSource, SysfsRegisterSource};
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;

/// Build the register source the monitor will poll
pub fn build(settings: &Settings) -> Arc<dyn RegisterSource> {
    if settings.mock {
        info!("Mock mode: registers are simulated in memory");
        Arc::new(empty_board(&settings.layout))
    } else {
        Arc::new(SysfsRegisterSource::new(
            settings.registers.root.clone(),
            settings.registers.verify_writes,
        ))
    }
}

/// Mock registers for `layout` with no modules inserted
pub fn empty_board(layout: &BoardLayout) -> MockRegisterSource {
    let mock = MockRegisterSource::new();

    for register in &layout.presence.registers {
        let all_bits = if register.width >= 64 {
            u64::MAX
        } else {
            (1u64 << register.width) - 1
        };
        let word = if layout.presence.active_low { all_bits } else { 0 };
        mock.set(&register.path, format!("{:#x}", word));
    }

    if let Some(reset) = &layout.reset_handshake {
        for &port in &reset.ports {
            mock.set(
                &BoardLayout::register_path(&reset.phase_register, port),
                ResetPhase::None.code().to_string(),
            );
        }
    }

    if let Some(tx) = &layout.tx_enable {
        for &port in &tx.ports {
            mock.set(
                &BoardLayout::register_path(&tx.register, port),
                tx.disable_value.clone(),
            );
        }
    }

    mock
}
