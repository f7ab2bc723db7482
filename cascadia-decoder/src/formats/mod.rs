//! Offline frame sources
//!
//! The decoder never talks to a transceiver. These parsers replay frames that
//! were captured elsewhere (SocketCAN `candump -l` logs) or typed by hand in
//! `cansend` notation, producing the same [`RawFrame`](crate::RawFrame)s a
//! driver would.

use crate::types::{RawFrame, Timestamp};

pub mod candump;

// Re-export parser types
pub use candump::{CandumpFrameIterator, CandumpParser};

/// A frame together with the capture metadata a log line carries
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedFrame {
    /// Capture time, if the source recorded one
    pub timestamp: Option<Timestamp>,
    /// Interface name, e.g. "can0"
    pub interface: Option<String>,
    pub frame: RawFrame,
}
