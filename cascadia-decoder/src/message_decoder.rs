//! Message Decoding Engine
//!
//! Turns one frame payload into decoded signals using a layout from the
//! schema catalog, or into a fault report for the fault message.

use crate::faults::FaultReport;
use crate::schema::MessageSchema;
use crate::types::{DecodedMessage, DecodedSignal, LengthWarning, RawFrame, MAX_PAYLOAD};

/// Message decoder - extracts signals from inverter frames
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode a broadcast frame through its schema
    ///
    /// Fields are read from the zero-padded payload, so a short frame still
    /// yields every field; the caller gets a [`LengthWarning`] alongside.
    pub fn decode_message(
        frame: &RawFrame,
        schema: &MessageSchema,
    ) -> (DecodedMessage, Option<LengthWarning>) {
        let payload = frame.padded_payload();
        let signals = Self::decode_signals(&payload, schema);
        let warning = Self::check_length(frame, schema.required_len());

        (
            DecodedMessage::Signals {
                kind: schema.kind,
                signals,
            },
            warning,
        )
    }

    /// Decode the fault word frame
    pub fn decode_fault(frame: &RawFrame) -> (DecodedMessage, Option<LengthWarning>) {
        let payload = frame.padded_payload();
        let report = FaultReport::from_payload(&payload);
        (DecodedMessage::Fault(report), Self::check_length(frame, MAX_PAYLOAD))
    }

    fn decode_signals(payload: &[u8; MAX_PAYLOAD], schema: &MessageSchema) -> Vec<DecodedSignal> {
        schema
            .fields
            .iter()
            .map(|field| field.kind.decode(field.name, &payload[field.offset..field.end()]))
            .collect()
    }

    fn check_length(frame: &RawFrame, required: usize) -> Option<LengthWarning> {
        if frame.dlc() >= required {
            return None;
        }

        log::warn!(
            "CAN ID 0x{:X} requires {} bytes but frame only has {} bytes",
            frame.id,
            required,
            frame.dlc()
        );
        Some(LengthWarning {
            required,
            available: frame.dlc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::lookup;
    use crate::types::SignalValue;

    #[test]
    fn test_decode_temperatures() {
        // 25.0, 26.0, 27.0, -1.0 C
        let frame = RawFrame::new(0x0A0, &[0xFA, 0x00, 0x04, 0x01, 0x0E, 0x01, 0xF6, 0xFF]).unwrap();
        let schema = lookup(0x00, false).unwrap();

        let (message, warning) = MessageDecoder::decode_message(&frame, schema);
        assert!(warning.is_none());

        let DecodedMessage::Signals { signals, .. } = message else {
            panic!("expected signals");
        };
        let values: Vec<f64> = signals.iter().map(|s| s.value.as_f64()).collect();
        assert_eq!(values, vec![25.0, 26.0, 27.0, -1.0]);
        assert_eq!(signals[3].name, "Gate Driver");
    }

    #[test]
    fn test_short_frame_reads_zeros() {
        let frame = RawFrame::from_parts(0x0A6, 2, [0x64, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF])
            .unwrap();
        let schema = lookup(0x06, false).unwrap();

        let (message, warning) = MessageDecoder::decode_message(&frame, schema);
        assert_eq!(warning, Some(LengthWarning { required: 8, available: 2 }));

        let DecodedMessage::Signals { signals, .. } = message else {
            panic!("expected signals");
        };
        assert_eq!(signals[0].value, SignalValue::Float(10.0));
        assert_eq!(signals[1].value, SignalValue::Float(0.0));
        assert_eq!(signals[3].value, SignalValue::Float(0.0));
    }

    #[test]
    fn test_internal_states_needs_only_four_bytes() {
        let frame = RawFrame::new(0x0AA, &[0x06, 0x0C, 0x03, 0x1F]).unwrap();
        let schema = lookup(0x0A, false).unwrap();

        let (_, warning) = MessageDecoder::decode_message(&frame, schema);
        assert!(warning.is_none());
    }

    #[test]
    fn test_short_fault_frame_warns() {
        let frame = RawFrame::new(0x0AB, &[0x01, 0x00]).unwrap();
        let (message, warning) = MessageDecoder::decode_fault(&frame);
        assert_eq!(warning, Some(LengthWarning { required: 8, available: 2 }));

        let DecodedMessage::Fault(report) = message else {
            panic!("expected fault report");
        };
        assert_eq!(report.post_faults, vec!["Hardware Gate/Desaturation Fault"]);
        assert!(report.run_faults.is_empty());
    }
}
