//! Fault word decoding
//!
//! The fault frame packs four little-endian 16-bit words: POST lo/hi at bytes
//! 0..4 and Run lo/hi at bytes 4..8. Each (lo, hi) pair is scanned against the
//! 32-entry catalog below; catalog index `i >= 16` tests bit `i - 16` of the
//! hi word.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

/// Fault names in bit order
pub const FAULT_CATALOG: [&str; 32] = [
    "Hardware Gate/Desaturation Fault",
    "HW Over-current Fault",
    "Accelerator Shorted",
    "Accelerator Open",
    "Current Sensor Low",
    "Current Sensor High",
    "Module Temperature Low",
    "Module Temperature High",
    "Control PCB Temperature Low",
    "Control PCB Temperature High",
    "Gate Drive PCB Temperature Low",
    "Gate Drive PCB Temperature High",
    "5V Sense Voltage Low",
    "5V Sense Voltage High",
    "12V Sense Voltage Low",
    "12V Sense Voltage High",
    "2.5V Sense Voltage Low",
    "2.5V Sense Voltage High",
    "1.5V Sense Voltage Low",
    "1.5V Sense Voltage High",
    "DC Bus Voltage High",
    "DC Bus Voltage Low",
    "Pre-charge Timeout",
    "Pre-charge Voltage Failure",
    "EEPROM Checksum Invalid",
    "EEPROM Data Out of Range",
    "EEPROM Update Required",
    "Hardware DC Bus Over-Voltage",
    "Gate Driver Initialization",
    "Reserved",
    "Brake Shorted",
    "Brake Open",
];

/// The four raw fault words of a fault frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FaultWords {
    pub post_lo: u16,
    pub post_hi: u16,
    pub run_lo: u16,
    pub run_hi: u16,
}

impl FaultWords {
    /// Split an 8-byte payload into its four words
    pub fn from_payload(payload: &[u8; 8]) -> Self {
        Self {
            post_lo: LittleEndian::read_u16(&payload[0..2]),
            post_hi: LittleEndian::read_u16(&payload[2..4]),
            run_lo: LittleEndian::read_u16(&payload[4..6]),
            run_hi: LittleEndian::read_u16(&payload[6..8]),
        }
    }

    pub fn is_clear(&self) -> bool {
        self.post_lo == 0 && self.post_hi == 0 && self.run_lo == 0 && self.run_hi == 0
    }
}

/// Catalog names for every set bit of a (lo, hi) word pair, in catalog order
pub fn triggered_faults(lo: u16, hi: u16) -> Vec<&'static str> {
    FAULT_CATALOG
        .iter()
        .enumerate()
        .filter(|&(i, _)| {
            let (word, mask) = if i < 16 {
                (lo, 1u16 << i)
            } else {
                (hi, 1u16 << (i - 16))
            };
            word & mask != 0
        })
        .map(|(_, name)| *name)
        .collect()
}

/// Decoded fault frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultReport {
    pub words: FaultWords,
    /// Faults raised during power-on self test
    pub post_faults: Vec<&'static str>,
    /// Faults raised while running
    pub run_faults: Vec<&'static str>,
}

impl FaultReport {
    pub fn from_payload(payload: &[u8; 8]) -> Self {
        let words = FaultWords::from_payload(payload);
        Self {
            words,
            post_faults: triggered_faults(words.post_lo, words.post_hi),
            run_faults: triggered_faults(words.run_lo, words.run_hi),
        }
    }

    pub fn has_faults(&self) -> bool {
        !self.post_faults.is_empty() || !self.run_faults.is_empty()
    }
}
