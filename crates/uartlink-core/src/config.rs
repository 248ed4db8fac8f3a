//! Bridge configuration.
//!
//! A [`BridgeConfig`] is built once from decoded query parameters and handed
//! to the capture controller; it is never mutated in place. A later `start`
//! replaces the whole value atomically.

use serde::{Deserialize, Serialize};

use crate::query;

/// Default line speed when `speed` is absent or unparseable.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Default TX pin when `tx` is absent or unparseable.
pub const DEFAULT_TX_PIN: u8 = 4;
/// Default RX pin when `rx` is absent or unparseable.
pub const DEFAULT_RX_PIN: u8 = 5;

/// Hardware line parameters for one capture session.
///
/// Pin numbers are part of the control wire format; host-side serial
/// backends bind a device path instead and keep the pins for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
    pub rx_pin: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            tx_pin: DEFAULT_TX_PIN,
            rx_pin: DEFAULT_RX_PIN,
        }
    }
}

impl BridgeConfig {
    /// Build a config from a raw query string.
    ///
    /// Each field is percent-decoded and integer-parsed independently;
    /// missing or garbled fields take their documented defaults.
    pub fn from_query(query: &str) -> Self {
        Self {
            baud_rate: query::get_parsed(query, "speed", DEFAULT_BAUD_RATE),
            tx_pin: query::get_parsed(query, "tx", DEFAULT_TX_PIN),
            rx_pin: query::get_parsed(query, "rx", DEFAULT_RX_PIN),
        }
    }
}
