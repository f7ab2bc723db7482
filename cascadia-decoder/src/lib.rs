//! Cascadia Inverter CAN Decoder Library
//!
//! A stateless, reusable library for decoding the broadcast telemetry of a
//! Cascadia-style motor controller (inverter / VSM) from raw CAN frames.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Routes a CAN ID to a frame layout (base ID + message type, or the fault ID)
//! - Extracts scaled little-endian fields (temperatures, voltages, currents, torques...)
//! - Maps VSM and inverter state codes to labels
//! - Expands the POST/Run fault words into named faults
//! - Replays candump logs as a frame source for offline analysis
//!
//! The library does NOT:
//! - Talk to CAN hardware (initialisation, bitrate, reception)
//! - Keep state between frames
//! - Format output
//!
//! Rendering and statistics live in the application layer (cascadia-cli).
//!
//! # Example Usage
//!
//! ```
//! use cascadia_decoder::{DecodedMessage, Decoder, DecoderConfig, RawFrame};
//!
//! let decoder = Decoder::with_config(DecoderConfig::new().with_extended_messages(true));
//!
//! // Internal States: VSM 6, 12 kHz PWM, inverter 3, relays 0x01
//! let frame = RawFrame::new(0x0AA, &[0x06, 0x0C, 0x03, 0x01, 0, 0, 0, 0]).unwrap();
//! let record = decoder.decode(&frame).unwrap();
//!
//! if let DecodedMessage::Signals { kind, signals } = &record.message {
//!     println!("{}:", kind);
//!     for signal in signals {
//!         println!("  {} = {}", signal.name, signal.value);
//!     }
//! }
//! assert_eq!(
//!     record.signal("VSM State").unwrap().value_description,
//!     Some("Motor Running State")
//! );
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod faults;
pub mod fields;
pub mod formats;
pub mod schema;
pub mod states;
pub mod types;

// Re-export main types for convenience
pub use config::{DecoderConfig, BASE_ID, FAULT_ID, MAX_MESSAGE_TYPE};
pub use decoder::{Decoder, DecodingIterator};
pub use faults::{FaultReport, FaultWords, FAULT_CATALOG};
pub use formats::{CandumpParser, LoggedFrame};
pub use states::{InverterState, VsmState};
pub use types::{
    DecodedMessage, DecodedRecord, DecodedSignal, DecoderError, LengthWarning, MessageKind,
    RawFrame, Result, SignalValue, Timestamp, Unit,
};

// Internal modules (not exposed in public API)
mod message_decoder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
