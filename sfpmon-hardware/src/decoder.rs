//! Presence bitfield decoding
//!
//! Turns the board's presence registers into one boolean per port, ordered
//! by port index, with `true` meaning a module is inserted.

use sfpmon_core::{parse_hex_word, BitOrder, BoardLayout, PresenceLayout, Result, SfpMonError};
use tracing::debug;

use crate::register_source::RegisterSource;

/// Expand raw register words into per-port presence
///
/// Words pair up with `layout.registers` in order; only the low `width`
/// bits of each word are used. Active-low layouts are inverted so the
/// result always reads `true = present`.
///
/// ```
/// use sfpmon_core::{BitOrder, PresenceLayout, PresenceRegister};
/// use sfpmon_hardware::decoder::decode_words;
///
/// let layout = PresenceLayout {
///     registers: vec![PresenceRegister::new("present", 4)],
///     bit_order: BitOrder::LsbFirst,
///     active_low: true,
/// };
/// // Bit 1 cleared: the second port is present
/// assert_eq!(decode_words(&[0b1101], &layout), vec![false, true, false, false]);
/// ```
pub fn decode_words(words: &[u64], layout: &PresenceLayout) -> Vec<bool> {
    let mut ports = Vec::with_capacity(layout.total_bits());

    for (&word, register) in words.iter().zip(&layout.registers) {
        let width = register.width;
        for i in 0..width {
            let shift = match layout.bit_order {
                BitOrder::LsbFirst => i,
                BitOrder::MsbFirst => width - 1 - i,
            };
            let bit_set = (word >> shift) & 1 == 1;
            ports.push(bit_set != layout.active_low);
        }
    }

    ports
}

/// Reads and decodes a board's presence registers
#[derive(Debug, Clone)]
pub struct PresenceDecoder {
    presence: PresenceLayout,
    port_count: usize,
}

impl PresenceDecoder {
    pub fn new(layout: &BoardLayout) -> Self {
        Self {
            presence: layout.presence.clone(),
            port_count: layout.port_count,
        }
    }

    /// Read every presence register and return one entry per port
    ///
    /// # Errors
    ///
    /// Any register read or parse failure is returned as-is; no default
    /// presence is substituted. A register set that covers fewer bits than
    /// the board has ports is a decode error.
    pub async fn decode(&self, source: &dyn RegisterSource) -> Result<Vec<bool>> {
        let mut words = Vec::with_capacity(self.presence.registers.len());
        for register in &self.presence.registers {
            let raw = source.read(&register.path).await?;
            let word = parse_hex_word(&raw)?;
            debug!("Presence register {} = {:#x}", register.path, word);
            words.push(word);
        }

        let mut ports = decode_words(&words, &self.presence);
        if ports.len() < self.port_count {
            return Err(SfpMonError::Decode(format!(
                "Presence registers yield {} bits for {} ports",
                ports.len(),
                self.port_count
            )));
        }
        ports.truncate(self.port_count);

        Ok(ports)
    }
}
