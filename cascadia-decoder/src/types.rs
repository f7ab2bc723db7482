//! Core types for the inverter CAN decoder library
//!
//! This module defines the raw frame handed in by the transport layer and the
//! typed records the decoder hands back. Records are plain data: they carry no
//! formatting and no history, so any number of renderers can share them.

use crate::faults::FaultReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Timestamp type used throughout the decoder
pub type Timestamp = DateTime<Utc>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Maximum payload of a classic CAN frame
pub const MAX_PAYLOAD: usize = 8;

/// Raw CAN frame as delivered by the transceiver driver or a log replay
///
/// `payload` is always 8 bytes wide; only the first `length` bytes are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawFrame {
    /// CAN arbitration ID (11-bit or 29-bit)
    pub id: u32,
    /// Number of valid payload bytes (0-8)
    pub length: u8,
    /// Payload buffer, bytes past `length` are ignored
    pub payload: [u8; MAX_PAYLOAD],
}

impl RawFrame {
    /// Build a frame from an ID and up to 8 data bytes
    pub fn new(id: u32, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_PAYLOAD {
            return Err(DecoderError::InvalidFrame(format!(
                "CAN ID 0x{:X} carries {} bytes, classic CAN allows at most {}",
                id,
                data.len(),
                MAX_PAYLOAD
            )));
        }

        let mut payload = [0u8; MAX_PAYLOAD];
        payload[..data.len()].copy_from_slice(data);

        Ok(Self {
            id,
            length: data.len() as u8,
            payload,
        })
    }

    /// Build a frame from the (id, length, buffer) triple a driver reports
    pub fn from_parts(id: u32, length: u8, payload: [u8; MAX_PAYLOAD]) -> Result<Self> {
        if length as usize > MAX_PAYLOAD {
            return Err(DecoderError::InvalidFrame(format!(
                "CAN ID 0x{:X} reports length {}, classic CAN allows at most {}",
                id, length, MAX_PAYLOAD
            )));
        }
        Ok(Self { id, length, payload })
    }

    /// The valid data bytes
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.length as usize]
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.length as usize
    }

    /// Payload with every byte past `length` forced to zero
    pub fn padded_payload(&self) -> [u8; MAX_PAYLOAD] {
        let mut padded = [0u8; MAX_PAYLOAD];
        padded[..self.dlc()].copy_from_slice(self.data());
        padded
    }
}

impl std::str::FromStr for RawFrame {
    type Err = DecoderError;

    /// Parse `cansend` notation, e.g. `0A7#F401000000000000`
    fn from_str(s: &str) -> Result<Self> {
        crate::formats::candump::parse_frame_spec(s)
            .map_err(|reason| DecoderError::FrameParse { line: 0, reason })
    }
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to parse frame at line {line}: {reason}")]
    FrameParse { line: usize, reason: String },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("CAN ID 0x{0:X} is outside the inverter message range")]
    UnroutableId(u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Engineering unit attached to a decoded signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Celsius,
    Degree,
    Volt,
    Ampere,
    NewtonMeter,
    Hertz,
    Kilohertz,
    Rpm,
    Watt,
    Second,
}

impl Unit {
    /// Short symbol used in text output
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Celsius => "C",
            Unit::Degree => "deg",
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::NewtonMeter => "Nm",
            Unit::Hertz => "Hz",
            Unit::Kilohertz => "kHz",
            Unit::Rpm => "RPM",
            Unit::Watt => "W",
            Unit::Second => "sec",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Signal value types supported by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// Signed integer value
    Integer(i64),
    /// Floating-point value (after scaling)
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Bit field, rendered in hexadecimal
    Flags(u32),
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Float(v) => write!(f, "{:.2}", v),
            SignalValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            SignalValue::Flags(v) => write!(f, "0x{:X}", v),
        }
    }
}

impl SignalValue {
    /// Convert signal value to f64
    pub fn as_f64(&self) -> f64 {
        match self {
            SignalValue::Integer(v) => *v as f64,
            SignalValue::Float(v) => *v,
            SignalValue::Boolean(v) => if *v { 1.0 } else { 0.0 },
            SignalValue::Flags(v) => *v as f64,
        }
    }

    /// Convert signal value to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SignalValue::Integer(v) => Some(*v),
            SignalValue::Float(v) => Some(*v as i64),
            SignalValue::Boolean(v) => Some(if *v { 1 } else { 0 }),
            SignalValue::Flags(v) => Some(*v as i64),
        }
    }

    /// Check if this is a boolean value
    pub fn as_bool(&self) -> bool {
        match self {
            SignalValue::Boolean(v) => *v,
            SignalValue::Integer(v) => *v != 0,
            SignalValue::Float(v) => *v != 0.0,
            SignalValue::Flags(v) => *v != 0,
        }
    }
}

/// A decoded signal with its physical value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedSignal {
    /// Signal label, e.g. "Module A"
    pub name: &'static str,
    /// Physical value after scaling
    pub value: SignalValue,
    /// Engineering unit, `None` for labels and bit fields
    pub unit: Option<Unit>,
    /// Human readable meaning of the raw value (state labels)
    pub value_description: Option<&'static str>,
    /// Raw value before scaling (useful for debugging)
    pub raw_value: i64,
}

/// Broadcast message families the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Temperatures1,
    Temperatures2,
    Temperatures3,
    DigitalInputs,
    MotorPosition,
    Currents,
    Voltages,
    InternalVoltages,
    InternalStates,
    TorqueTimer,
}

impl MessageKind {
    /// Heading printed above the frame's signals
    pub fn title(&self) -> &'static str {
        match self {
            MessageKind::Temperatures1 => "Temperatures #1",
            MessageKind::Temperatures2 => "Temperatures #2",
            MessageKind::Temperatures3 => "Temperatures #3",
            MessageKind::DigitalInputs => "Digital Inputs",
            MessageKind::MotorPosition => "Motor Position",
            MessageKind::Currents => "Currents",
            MessageKind::Voltages => "Voltages",
            MessageKind::InternalVoltages => "Internal Voltages",
            MessageKind::InternalStates => "Internal States",
            MessageKind::TorqueTimer => "Torque & Timer",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Payload of a decoded record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodedMessage {
    /// A broadcast frame decoded through the schema table
    Signals {
        kind: MessageKind,
        signals: Vec<DecodedSignal>,
    },
    /// The fault word frame
    Fault(FaultReport),
    /// A message type inside the inverter range with no schema
    Unhandled { msg_type: u8 },
}

/// Emitted when a frame is shorter than its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthWarning {
    /// Bytes the schema reads
    pub required: usize,
    /// Bytes the frame actually carried
    pub available: usize,
}

impl fmt::Display for LengthWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame carries {} of {} bytes, missing bytes read as zero",
            self.available, self.required
        )
    }
}

/// Main decoded record type - the primary output of the decoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRecord {
    /// CAN ID the record was decoded from
    pub can_id: u32,
    /// Length reported by the frame
    pub length: u8,
    /// Decoded content
    pub message: DecodedMessage,
    /// Set when the frame was shorter than its schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_warning: Option<LengthWarning>,
}

impl DecodedRecord {
    /// All decoded signals (empty for fault and unhandled records)
    pub fn signals(&self) -> &[DecodedSignal] {
        match &self.message {
            DecodedMessage::Signals { signals, .. } => signals,
            _ => &[],
        }
    }

    /// Look up a decoded signal by its label
    pub fn signal(&self, name: &str) -> Option<&DecodedSignal> {
        self.signals().iter().find(|s| s.name == name)
    }

    /// Fault report, if this is the fault frame
    pub fn fault_report(&self) -> Option<&FaultReport> {
        match &self.message {
            DecodedMessage::Fault(report) => Some(report),
            _ => None,
        }
    }

    /// Check if the message type had no schema
    pub fn is_unhandled(&self) -> bool {
        matches!(self.message, DecodedMessage::Unhandled { .. })
    }
}
