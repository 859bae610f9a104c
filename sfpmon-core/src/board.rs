//! Board layouts and presets
//!
//! Every supported switch runs the same transceiver monitor; what differs is
//! where the presence bits live, how they are ordered, and which ports carry
//! extra wiring (reset handshakes, transmit-enable lines). A [`BoardLayout`]
//! captures those differences as plain data so a board can be described in a
//! config file as easily as it can be selected from a [`BoardType`] preset.
//!
//! Note: register I/O is in the `sfpmon-hardware` crate. This module only
//! describes where registers are and how to interpret them.

use crate::{PortIndex, Result, SfpMonError};
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the 1-based port index in register templates
pub const PORT_PLACEHOLDER: &str = "{port}";

/// Order in which bits of one presence register map onto ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Bit 0 belongs to the first port of the register's group
    LsbFirst,
    /// Bit `width - 1` belongs to the first port of the register's group
    MsbFirst,
}

/// One presence register and the number of ports it covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRegister {
    /// Register path relative to the register root
    pub path: String,
    /// Number of meaningful bits (1-64)
    pub width: u32,
}

impl PresenceRegister {
    pub fn new(path: impl Into<String>, width: u32) -> Self {
        Self {
            path: path.into(),
            width,
        }
    }
}

fn default_active_low() -> bool {
    true
}

/// Where presence bits are read from and how they are interpreted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceLayout {
    /// Registers read in order; their bits are concatenated
    pub registers: Vec<PresenceRegister>,
    /// Bit order inside each register
    pub bit_order: BitOrder,
    /// Raw bit 0 means present
    #[serde(default = "default_active_low")]
    pub active_low: bool,
}

impl PresenceLayout {
    /// Total number of port bits across all registers
    pub fn total_bits(&self) -> usize {
        self.registers.iter().map(|r| r.width as usize).sum()
    }
}

/// Ports gated by the hardware reset handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetHandshakeLayout {
    /// Ports whose presence is gated by the handshake
    pub ports: Vec<PortIndex>,
    /// Phase register template, e.g. `port{port}/reset_status`
    pub phase_register: String,
}

fn default_enable_value() -> String {
    "1".to_string()
}

fn default_disable_value() -> String {
    "0".to_string()
}

/// Ports with a transmit-enable line that must follow presence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEnableLayout {
    /// Ports wired to a transmit-enable register
    pub ports: Vec<PortIndex>,
    /// Register template, e.g. `port{port}/tx_enable`
    pub register: String,
    #[serde(default = "default_enable_value")]
    pub enable_value: String,
    #[serde(default = "default_disable_value")]
    pub disable_value: String,
    /// Enable transmit at startup for ports already present
    #[serde(default)]
    pub enable_on_init: bool,
}

/// Runtime description of one board's transceiver wiring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Human-readable board name
    pub name: String,
    /// Number of front-panel transceiver ports
    pub port_count: usize,
    /// Presence register map
    pub presence: PresenceLayout,
    /// Reset handshake wiring, if the board has one
    #[serde(default)]
    pub reset_handshake: Option<ResetHandshakeLayout>,
    /// Transmit-enable wiring, if the board has one
    #[serde(default)]
    pub tx_enable: Option<TxEnableLayout>,
}

impl BoardLayout {
    /// Check that the layout is internally consistent
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the layout has no ports, no presence
    /// registers, a register wider than 64 bits, fewer presence bits than
    /// ports, a hook port outside `1..=port_count`, or a register template
    /// without the `{port}` placeholder.
    ///
    /// # Examples
    ///
    /// ```
    /// use sfpmon_core::BoardType;
    ///
    /// let layout = BoardType::Osfp64Sfp2.to_layout().unwrap();
    /// assert!(layout.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.port_count == 0 {
            return Err(SfpMonError::Config(format!(
                "Board '{}' has no ports",
                self.name
            )));
        }

        if self.presence.registers.is_empty() {
            return Err(SfpMonError::Config(format!(
                "Board '{}' has no presence registers",
                self.name
            )));
        }

        for register in &self.presence.registers {
            if register.width == 0 || register.width > 64 {
                return Err(SfpMonError::Config(format!(
                    "Presence register '{}' has width {} (must be 1-64)",
                    register.path, register.width
                )));
            }
        }

        let total_bits = self.presence.total_bits();
        if total_bits < self.port_count {
            return Err(SfpMonError::Config(format!(
                "Board '{}' has {} ports but presence registers only cover {} bits",
                self.name, self.port_count, total_bits
            )));
        }

        if let Some(reset) = &self.reset_handshake {
            self.validate_template(&reset.phase_register)?;
            self.validate_ports("reset handshake", &reset.ports)?;
        }

        if let Some(tx) = &self.tx_enable {
            self.validate_template(&tx.register)?;
            self.validate_ports("transmit enable", &tx.ports)?;
        }

        Ok(())
    }

    fn validate_template(&self, template: &str) -> Result<()> {
        if !template.contains(PORT_PLACEHOLDER) {
            return Err(SfpMonError::Config(format!(
                "Register template '{}' is missing the {} placeholder",
                template, PORT_PLACEHOLDER
            )));
        }
        Ok(())
    }

    fn validate_ports(&self, what: &str, ports: &[PortIndex]) -> Result<()> {
        for &port in ports {
            if port == 0 || port > self.port_count {
                return Err(SfpMonError::Config(format!(
                    "Board '{}' lists port {} for {} (must be 1-{})",
                    self.name, port, what, self.port_count
                )));
            }
        }
        Ok(())
    }

    /// Validate a 1-based port index against this board's port count
    pub fn validate_port(&self, port: PortIndex) -> Result<()> {
        if port == 0 || port > self.port_count {
            return Err(SfpMonError::InvalidPort {
                port,
                max: self.port_count,
            });
        }
        Ok(())
    }

    /// Expand a per-port register template for `port`
    ///
    /// ```
    /// use sfpmon_core::BoardLayout;
    ///
    /// assert_eq!(
    ///     BoardLayout::register_path("port{port}/tx_enable", 65),
    ///     "port65/tx_enable"
    /// );
    /// ```
    pub fn register_path(template: &str, port: PortIndex) -> String {
        template.replace(PORT_PLACEHOLDER, &port.to_string())
    }
}

/// Built-in board presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardType {
    /// 32 QSFP ports plus 2 SFP+ ports with transmit-enable lines
    Qsfp32Sfp2,
    /// 36 QSFP ports
    Qsfp36,
    /// 64 OSFP ports behind the reset handshake
    Osfp64,
    /// 64 OSFP ports plus 2 SFP ports with transmit-enable lines
    Osfp64Sfp2,
    /// Layout supplied by the configuration file
    Custom,
}

impl std::str::FromStr for BoardType {
    type Err = SfpMonError;

    /// Parse board type from string (for the `--board` flag)
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use sfpmon_core::BoardType;
    ///
    /// assert_eq!(BoardType::from_str("OSFP64").unwrap(), BoardType::Osfp64);
    /// assert!(BoardType::from_str("unknown").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "qsfp32-sfp2" => Ok(BoardType::Qsfp32Sfp2),
            "qsfp36" => Ok(BoardType::Qsfp36),
            "osfp64" => Ok(BoardType::Osfp64),
            "osfp64-sfp2" => Ok(BoardType::Osfp64Sfp2),
            "custom" => Ok(BoardType::Custom),
            _ => Err(SfpMonError::InvalidInput(format!(
                "Unknown board type: '{}'. Valid options: qsfp32-sfp2, qsfp36, osfp64, osfp64-sfp2, custom",
                s
            ))),
        }
    }
}

impl BoardType {
    /// Get human-readable board name
    pub fn name(&self) -> &'static str {
        match self {
            BoardType::Qsfp32Sfp2 => "32xQSFP + 2xSFP",
            BoardType::Qsfp36 => "36xQSFP",
            BoardType::Osfp64 => "64xOSFP",
            BoardType::Osfp64Sfp2 => "64xOSFP + 2xSFP",
            BoardType::Custom => "Custom",
        }
    }

    /// Convert a preset into its runtime layout
    ///
    /// # Errors
    ///
    /// `Custom` has no built-in layout and returns a configuration error;
    /// its layout must come from the config file.
    pub fn to_layout(self) -> Result<BoardLayout> {
        let layout = match self {
            BoardType::Qsfp32Sfp2 => BoardLayout {
                name: self.name().to_string(),
                port_count: 34,
                presence: PresenceLayout {
                    registers: vec![
                        PresenceRegister::new("qsfp_present", 32),
                        PresenceRegister::new("sfp_present", 2),
                    ],
                    bit_order: BitOrder::MsbFirst,
                    active_low: true,
                },
                reset_handshake: None,
                tx_enable: Some(TxEnableLayout {
                    ports: vec![33, 34],
                    register: "sfp{port}/tx_enable".to_string(),
                    enable_value: default_enable_value(),
                    disable_value: default_disable_value(),
                    enable_on_init: false,
                }),
            },
            BoardType::Qsfp36 => BoardLayout {
                name: self.name().to_string(),
                port_count: 36,
                presence: PresenceLayout {
                    registers: vec![
                        PresenceRegister::new("port_present_1", 32),
                        PresenceRegister::new("port_present_2", 4),
                    ],
                    bit_order: BitOrder::LsbFirst,
                    active_low: true,
                },
                reset_handshake: None,
                tx_enable: None,
            },
            BoardType::Osfp64 => BoardLayout {
                name: self.name().to_string(),
                port_count: 64,
                presence: PresenceLayout {
                    registers: vec![
                        PresenceRegister::new("present_lo", 32),
                        PresenceRegister::new("present_hi", 32),
                    ],
                    bit_order: BitOrder::LsbFirst,
                    active_low: true,
                },
                reset_handshake: Some(ResetHandshakeLayout {
                    ports: (1..=64).collect(),
                    phase_register: "port{port}/reset_status".to_string(),
                }),
                tx_enable: None,
            },
            BoardType::Osfp64Sfp2 => BoardLayout {
                name: self.name().to_string(),
                port_count: 66,
                presence: PresenceLayout {
                    registers: vec![
                        PresenceRegister::new("present_lo", 32),
                        PresenceRegister::new("present_hi", 32),
                        PresenceRegister::new("sfp_present", 2),
                    ],
                    bit_order: BitOrder::LsbFirst,
                    active_low: true,
                },
                reset_handshake: Some(ResetHandshakeLayout {
                    ports: (1..=64).collect(),
                    phase_register: "port{port}/reset_status".to_string(),
                }),
                tx_enable: Some(TxEnableLayout {
                    ports: vec![65, 66],
                    register: "port{port}/tx_enable".to_string(),
                    enable_value: default_enable_value(),
                    disable_value: default_disable_value(),
                    enable_on_init: true,
                }),
            },
            BoardType::Custom => {
                return Err(SfpMonError::Config(
                    "Board type 'custom' requires a [board.layout] table in the config file"
                        .to_string(),
                ))
            }
        };

        Ok(layout)
    }
}

impl std::fmt::Display for BoardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BoardType::Qsfp32Sfp2 => "qsfp32-sfp2",
            BoardType::Qsfp36 => "qsfp36",
            BoardType::Osfp64 => "osfp64",
            BoardType::Osfp64Sfp2 => "osfp64-sfp2",
            BoardType::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}
