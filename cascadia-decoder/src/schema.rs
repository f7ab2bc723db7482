//! Frame schema catalog
//!
//! One entry per broadcast message type, keyed by the offset of the CAN ID
//! from the base ID. Each entry lists its fields in payload order; the message
//! decoder walks the list instead of hard-coding byte offsets per frame.

use crate::fields::FieldKind;
use crate::types::MessageKind;
use serde::Serialize;

/// One field of a frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Label printed next to the value
    pub name: &'static str,
    /// Byte offset of the field inside the payload
    pub offset: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, kind: FieldKind) -> Self {
        Self { name, offset, kind }
    }

    /// First byte past the field
    pub fn end(&self) -> usize {
        self.offset + self.kind.width()
    }
}

/// Layout of one broadcast message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageSchema {
    /// CAN ID offset from the base ID
    pub msg_type: u8,
    pub kind: MessageKind,
    pub fields: &'static [FieldSpec],
}

impl MessageSchema {
    /// Number of payload bytes the layout reads
    pub fn required_len(&self) -> usize {
        self.fields.iter().map(FieldSpec::end).max().unwrap_or(0)
    }
}

use FieldKind::*;

const TEMPERATURES_1: &[FieldSpec] = &[
    FieldSpec::new("Module A", 0, Temperature),
    FieldSpec::new("Module B", 2, Temperature),
    FieldSpec::new("Module C", 4, Temperature),
    FieldSpec::new("Gate Driver", 6, Temperature),
];

const TEMPERATURES_2: &[FieldSpec] = &[
    FieldSpec::new("Control Board", 0, Temperature),
    FieldSpec::new("RTD1", 2, Temperature),
    FieldSpec::new("RTD2", 4, Temperature),
    FieldSpec::new("RTD3", 6, Temperature),
];

const TEMPERATURES_3: &[FieldSpec] = &[
    FieldSpec::new("Coolant", 0, Temperature),
    FieldSpec::new("Hotspot", 2, Temperature),
    FieldSpec::new("Motor", 4, Temperature),
    FieldSpec::new("Torque Shudder", 6, Torque),
];

const MOTOR_POSITION: &[FieldSpec] = &[
    FieldSpec::new("Angle", 0, Angle),
    FieldSpec::new("Speed", 2, AngularVelocity),
    FieldSpec::new("Freq", 4, Frequency),
    FieldSpec::new("Delta Resolver", 6, Angle),
];

const CURRENTS: &[FieldSpec] = &[
    FieldSpec::new("Phase A", 0, Current),
    FieldSpec::new("Phase B", 2, Current),
    FieldSpec::new("Phase C", 4, Current),
    FieldSpec::new("DC Bus", 6, Current),
];

const VOLTAGES: &[FieldSpec] = &[
    FieldSpec::new("DC Bus", 0, HighVoltage),
    FieldSpec::new("Output", 2, HighVoltage),
    FieldSpec::new("VAB/Vd", 4, HighVoltage),
    FieldSpec::new("VBC/Vq", 6, HighVoltage),
];

const INTERNAL_STATES: &[FieldSpec] = &[
    FieldSpec::new("VSM State", 0, VsmState),
    FieldSpec::new("PWM Freq", 1, PwmFrequency),
    FieldSpec::new("Inverter State", 2, InverterState),
    FieldSpec::new("Relay State", 3, RelayState),
];

const TORQUE_TIMER: &[FieldSpec] = &[
    FieldSpec::new("Cmd Torque", 0, Torque),
    FieldSpec::new("Feedback Torque", 2, Torque),
    FieldSpec::new("Power Timer", 4, PowerTimer),
];

const DIGITAL_INPUTS: &[FieldSpec] = &[
    FieldSpec::new("Digital Input 1", 0, Boolean),
    FieldSpec::new("Digital Input 2", 1, Boolean),
    FieldSpec::new("Digital Input 3", 2, Boolean),
    FieldSpec::new("Digital Input 4", 3, Boolean),
    FieldSpec::new("Digital Input 5", 4, Boolean),
    FieldSpec::new("Digital Input 6", 5, Boolean),
    FieldSpec::new("Digital Input 7", 6, Boolean),
    FieldSpec::new("Digital Input 8", 7, Boolean),
];

const INTERNAL_VOLTAGES: &[FieldSpec] = &[
    FieldSpec::new("1.5V Reference", 0, LowVoltage),
    FieldSpec::new("2.5V Reference", 2, LowVoltage),
    FieldSpec::new("5V Reference", 4, LowVoltage),
    FieldSpec::new("12V System", 6, LowVoltage),
];

/// Message types decoded by default
pub static STANDARD_SCHEMAS: &[MessageSchema] = &[
    MessageSchema { msg_type: 0x00, kind: MessageKind::Temperatures1, fields: TEMPERATURES_1 },
    MessageSchema { msg_type: 0x01, kind: MessageKind::Temperatures2, fields: TEMPERATURES_2 },
    MessageSchema { msg_type: 0x02, kind: MessageKind::Temperatures3, fields: TEMPERATURES_3 },
    MessageSchema { msg_type: 0x05, kind: MessageKind::MotorPosition, fields: MOTOR_POSITION },
    MessageSchema { msg_type: 0x06, kind: MessageKind::Currents, fields: CURRENTS },
    MessageSchema { msg_type: 0x07, kind: MessageKind::Voltages, fields: VOLTAGES },
    MessageSchema { msg_type: 0x0A, kind: MessageKind::InternalStates, fields: INTERNAL_STATES },
    MessageSchema { msg_type: 0x0C, kind: MessageKind::TorqueTimer, fields: TORQUE_TIMER },
];

/// Message types decoded only when the extended set is enabled
pub static EXTENDED_SCHEMAS: &[MessageSchema] = &[
    MessageSchema { msg_type: 0x04, kind: MessageKind::DigitalInputs, fields: DIGITAL_INPUTS },
    MessageSchema { msg_type: 0x09, kind: MessageKind::InternalVoltages, fields: INTERNAL_VOLTAGES },
];

/// Find the layout for a message type
pub fn lookup(msg_type: u8, extended: bool) -> Option<&'static MessageSchema> {
    let standard = STANDARD_SCHEMAS.iter().find(|s| s.msg_type == msg_type);
    if standard.is_some() || !extended {
        return standard;
    }
    EXTENDED_SCHEMAS.iter().find(|s| s.msg_type == msg_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lookup() {
        assert_eq!(lookup(0x07, false).map(|s| s.kind), Some(MessageKind::Voltages));
        assert_eq!(lookup(0x0C, false).map(|s| s.kind), Some(MessageKind::TorqueTimer));
        assert!(lookup(0x03, false).is_none());
        assert!(lookup(0x20, true).is_none());
    }

    #[test]
    fn test_extended_lookup_is_opt_in() {
        assert!(lookup(0x04, false).is_none());
        assert!(lookup(0x09, false).is_none());
        assert_eq!(lookup(0x04, true).map(|s| s.kind), Some(MessageKind::DigitalInputs));
        assert_eq!(lookup(0x09, true).map(|s| s.kind), Some(MessageKind::InternalVoltages));
    }

    #[test]
    fn test_layouts_fit_classic_payload() {
        for schema in STANDARD_SCHEMAS.iter().chain(EXTENDED_SCHEMAS) {
            assert!(schema.required_len() <= 8, "{:?} overruns the payload", schema.kind);
        }
    }

    #[test]
    fn test_internal_states_reads_four_bytes() {
        let schema = lookup(0x0A, false).unwrap();
        assert_eq!(schema.required_len(), 4);
    }

    #[test]
    fn test_message_types_are_unique() {
        let mut seen: Vec<u8> = STANDARD_SCHEMAS
            .iter()
            .chain(EXTENDED_SCHEMAS)
            .map(|s| s.msg_type)
            .collect();
        let total = seen.len();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }
}
