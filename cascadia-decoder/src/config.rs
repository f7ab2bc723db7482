//! Decoder configuration types
//!
//! This module defines the minimal configuration needed by the decoder library:
//! where the inverter's broadcast block starts on the bus, which ID carries the
//! fault words, and whether the extended message set is decoded.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Default CAN ID of the first broadcast message (Temperatures #1)
pub const BASE_ID: u32 = 0x0A0;

/// Default CAN ID of the fault word message
pub const FAULT_ID: u32 = 0x0AB;

/// Highest message type offset inside the broadcast block
pub const MAX_MESSAGE_TYPE: u8 = 0x2F;

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// CAN ID of message type 0x00
    #[serde(default = "default_base_id")]
    pub base_id: u32,

    /// CAN ID carrying the POST/Run fault words
    #[serde(default = "default_fault_id")]
    pub fault_id: u32,

    /// Decode digital inputs (0x04) and internal voltages (0x09)
    #[serde(default)]
    pub extended_messages: bool,
}

fn default_base_id() -> u32 {
    BASE_ID
}

fn default_fault_id() -> u32 {
    FAULT_ID
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            base_id: BASE_ID,
            fault_id: FAULT_ID,
            extended_messages: false,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: move the broadcast block
    pub fn with_base_id(mut self, base_id: u32) -> Self {
        self.base_id = base_id;
        self
    }

    /// Builder method: move the fault message
    pub fn with_fault_id(mut self, fault_id: u32) -> Self {
        self.fault_id = fault_id;
        self
    }

    /// Builder method: enable or disable the extended message set
    pub fn with_extended_messages(mut self, enabled: bool) -> Self {
        self.extended_messages = enabled;
        self
    }

    /// CAN IDs of the broadcast block
    pub fn message_range(&self) -> RangeInclusive<u32> {
        self.base_id..=self.base_id.saturating_add(MAX_MESSAGE_TYPE as u32)
    }

    /// Message type offset of a CAN ID, if it lies in the broadcast block
    pub fn message_type(&self, can_id: u32) -> Option<u8> {
        if self.message_range().contains(&can_id) {
            Some((can_id - self.base_id) as u8)
        } else {
            None
        }
    }

    /// Check if a frame should be handed to the decoder
    pub fn should_process_frame(&self, can_id: u32) -> bool {
        can_id == self.fault_id || self.message_range().contains(&can_id)
    }
}
