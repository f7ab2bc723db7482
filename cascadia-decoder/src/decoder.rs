//! Main decoder API
//!
//! This module provides the frame router. A [`Decoder`] holds nothing but its
//! configuration, so one instance can be shared freely between threads and
//! every call decodes exactly one frame.

use crate::config::DecoderConfig;
use crate::message_decoder::MessageDecoder;
use crate::schema;
use crate::types::{DecodedMessage, DecodedRecord, DecoderError, RawFrame, Result, MAX_PAYLOAD};

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder for the default ID layout (base 0x0A0, faults 0x0AB)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with an explicit configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Check if a CAN ID belongs to the inverter (broadcast block or fault ID)
    pub fn accepts(&self, can_id: u32) -> bool {
        self.config.should_process_frame(can_id)
    }

    /// Decode one frame
    ///
    /// # Returns
    /// * `Ok(DecodedRecord)` for any accepted ID, including message types with
    ///   no schema (reported as [`DecodedMessage::Unhandled`])
    /// * `Err(DecoderError::UnroutableId)` if the ID is outside the inverter range
    ///
    /// # Example
    /// ```
    /// use cascadia_decoder::{Decoder, RawFrame};
    ///
    /// let decoder = Decoder::new();
    /// let frame = RawFrame::new(0x0A7, &[0xF4, 0x01, 0, 0, 0, 0, 0, 0]).unwrap();
    /// let record = decoder.decode(&frame).unwrap();
    /// assert_eq!(record.signal("DC Bus").unwrap().value.as_f64(), 50.0);
    /// ```
    pub fn decode(&self, frame: &RawFrame) -> Result<DecodedRecord> {
        let can_id = frame.id;

        // The fault ID sits inside the broadcast block, so it is checked first
        let (message, length_warning) = if can_id == self.config.fault_id {
            log::debug!("Decoding fault words (ID 0x{:X})", can_id);
            MessageDecoder::decode_fault(frame)
        } else if let Some(msg_type) = self.config.message_type(can_id) {
            match schema::lookup(msg_type, self.config.extended_messages) {
                Some(layout) => {
                    log::debug!("Decoding message: {} (ID 0x{:X})", layout.kind, can_id);
                    MessageDecoder::decode_message(frame, layout)
                }
                None => {
                    log::trace!("Unhandled message type 0x{:X} (ID 0x{:X})", msg_type, can_id);
                    (DecodedMessage::Unhandled { msg_type }, None)
                }
            }
        } else {
            return Err(DecoderError::UnroutableId(can_id));
        };

        Ok(DecodedRecord {
            can_id,
            length: frame.length,
            message,
            length_warning,
        })
    }

    /// Decode from the (id, length, buffer) triple a driver reports
    pub fn decode_parts(&self, id: u32, length: u8, payload: [u8; MAX_PAYLOAD]) -> Result<DecodedRecord> {
        let frame = RawFrame::from_parts(id, length, payload)?;
        self.decode(&frame)
    }

    /// Decode a stream of frames, skipping IDs outside the inverter range
    ///
    /// # Example
    /// ```
    /// use cascadia_decoder::{Decoder, RawFrame};
    ///
    /// let frames = vec![
    ///     RawFrame::new(0x123, &[0; 8]),
    ///     RawFrame::new(0x0AB, &[0; 8]),
    /// ];
    /// let records: Vec<_> = Decoder::new().decode_frames(frames).collect();
    /// assert_eq!(records.len(), 1);
    /// ```
    pub fn decode_frames<I>(&self, frames: I) -> DecodingIterator<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Result<RawFrame>>,
    {
        DecodingIterator::new(frames.into_iter(), self)
    }
}

/// Iterator that decodes raw frames into records
///
/// Frames the range filter rejects produce no item; frame errors from the
/// underlying source are passed through.
pub struct DecodingIterator<'a, I>
where
    I: Iterator<Item = Result<RawFrame>>,
{
    frame_iter: I,
    decoder: &'a Decoder,
}

impl<'a, I> DecodingIterator<'a, I>
where
    I: Iterator<Item = Result<RawFrame>>,
{
    fn new(frame_iter: I, decoder: &'a Decoder) -> Self {
        Self { frame_iter, decoder }
    }
}

impl<'a, I> Iterator for DecodingIterator<'a, I>
where
    I: Iterator<Item = Result<RawFrame>>,
{
    type Item = Result<DecodedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.frame_iter.next()? {
                Ok(frame) if self.decoder.accepts(frame.id) => {
                    return Some(self.decoder.decode(&frame));
                }
                Ok(frame) => {
                    log::trace!("Skipping CAN ID 0x{:X}", frame.id);
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
