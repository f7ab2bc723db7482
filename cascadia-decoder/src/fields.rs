//! Field decoders
//!
//! Every analog quantity the inverter broadcasts is a little-endian 16-bit
//! two's-complement integer with a fixed divisor per quantity. The helpers
//! here read one field window; callers slice the payload at the field offset.

use crate::states::{InverterState, VsmState};
use crate::types::{DecodedSignal, SignalValue, Unit};
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

/// Divisor for temperatures (0.1 °C per bit)
pub const TEMPERATURE_SCALE: f64 = 10.0;
/// Divisor for DC bus and phase voltages
pub const HIGH_VOLTAGE_SCALE: f64 = 10.0;
/// Divisor for reference and supply voltages
pub const LOW_VOLTAGE_SCALE: f64 = 100.0;
/// Divisor for currents
pub const CURRENT_SCALE: f64 = 10.0;
/// Divisor for torques
pub const TORQUE_SCALE: f64 = 10.0;
/// Divisor for electrical frequency
pub const FREQUENCY_SCALE: f64 = 10.0;
/// Divisor for power
pub const POWER_SCALE: f64 = 10.0;

/// Seconds per power-on timer tick
pub const TIMER_TICK_SECONDS: f64 = 0.003;

/// Read `bytes[0..2]` as a little-endian i16 and divide by `divisor`
///
/// # Panics
/// Panics if `bytes` holds fewer than two bytes.
pub fn decode_signed_scaled(bytes: &[u8], divisor: f64) -> f64 {
    LittleEndian::read_i16(bytes) as f64 / divisor
}

/// Motor speed in RPM, unscaled
pub fn decode_angular_velocity(bytes: &[u8]) -> i16 {
    LittleEndian::read_i16(bytes)
}

/// True iff the first byte is non-zero
pub fn decode_boolean(bytes: &[u8]) -> bool {
    bytes[0] > 0
}

/// Little-endian unsigned 32-bit read
pub fn decode_u32(bytes: &[u8]) -> u32 {
    LittleEndian::read_u32(bytes)
}

pub fn decode_temperature(bytes: &[u8]) -> f64 {
    decode_signed_scaled(bytes, TEMPERATURE_SCALE)
}

pub fn decode_high_voltage(bytes: &[u8]) -> f64 {
    decode_signed_scaled(bytes, HIGH_VOLTAGE_SCALE)
}

pub fn decode_low_voltage(bytes: &[u8]) -> f64 {
    decode_signed_scaled(bytes, LOW_VOLTAGE_SCALE)
}

pub fn decode_current(bytes: &[u8]) -> f64 {
    decode_signed_scaled(bytes, CURRENT_SCALE)
}

pub fn decode_torque(bytes: &[u8]) -> f64 {
    decode_signed_scaled(bytes, TORQUE_SCALE)
}

pub fn decode_frequency(bytes: &[u8]) -> f64 {
    decode_signed_scaled(bytes, FREQUENCY_SCALE)
}

pub fn decode_power(bytes: &[u8]) -> f64 {
    decode_signed_scaled(bytes, POWER_SCALE)
}

/// Layout flavour of a single field inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Temperature,
    HighVoltage,
    LowVoltage,
    Current,
    Torque,
    Frequency,
    Power,
    /// Resolver angle; shares the temperature encoding (÷10)
    Angle,
    AngularVelocity,
    Boolean,
    VsmState,
    InverterState,
    /// Switching frequency byte in kHz
    PwmFrequency,
    /// Relay output bit field byte
    RelayState,
    /// 32-bit power-on tick counter
    PowerTimer,
}

impl FieldKind {
    /// Number of payload bytes the field occupies
    pub fn width(&self) -> usize {
        match self {
            FieldKind::Boolean
            | FieldKind::VsmState
            | FieldKind::InverterState
            | FieldKind::PwmFrequency
            | FieldKind::RelayState => 1,
            FieldKind::PowerTimer => 4,
            _ => 2,
        }
    }

    /// Engineering unit of the decoded value
    pub fn unit(&self) -> Option<Unit> {
        match self {
            FieldKind::Temperature => Some(Unit::Celsius),
            FieldKind::HighVoltage | FieldKind::LowVoltage => Some(Unit::Volt),
            FieldKind::Current => Some(Unit::Ampere),
            FieldKind::Torque => Some(Unit::NewtonMeter),
            FieldKind::Frequency => Some(Unit::Hertz),
            FieldKind::Power => Some(Unit::Watt),
            FieldKind::Angle => Some(Unit::Degree),
            FieldKind::AngularVelocity => Some(Unit::Rpm),
            FieldKind::PwmFrequency => Some(Unit::Kilohertz),
            FieldKind::PowerTimer => Some(Unit::Second),
            FieldKind::Boolean
            | FieldKind::VsmState
            | FieldKind::InverterState
            | FieldKind::RelayState => None,
        }
    }

    /// Fixed divisor applied to the raw integer, if the field is scaled
    pub fn divisor(&self) -> Option<f64> {
        match self {
            FieldKind::Temperature | FieldKind::Angle => Some(TEMPERATURE_SCALE),
            FieldKind::HighVoltage => Some(HIGH_VOLTAGE_SCALE),
            FieldKind::LowVoltage => Some(LOW_VOLTAGE_SCALE),
            FieldKind::Current => Some(CURRENT_SCALE),
            FieldKind::Torque => Some(TORQUE_SCALE),
            FieldKind::Frequency => Some(FREQUENCY_SCALE),
            FieldKind::Power => Some(POWER_SCALE),
            _ => None,
        }
    }

    /// Decode the field from its window (`bytes` starts at the field offset)
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than [`FieldKind::width`].
    pub fn decode(&self, name: &'static str, bytes: &[u8]) -> DecodedSignal {
        let (value, raw_value, value_description) = match self {
            FieldKind::AngularVelocity => {
                let rpm = decode_angular_velocity(bytes);
                (SignalValue::Integer(rpm as i64), rpm as i64, None)
            }
            FieldKind::Boolean => {
                let set = decode_boolean(bytes);
                (SignalValue::Boolean(set), bytes[0] as i64, None)
            }
            FieldKind::VsmState => {
                let state = VsmState::from(bytes[0]);
                (SignalValue::Integer(bytes[0] as i64), bytes[0] as i64, Some(state.label()))
            }
            FieldKind::InverterState => {
                let state = InverterState::from(bytes[0]);
                (SignalValue::Integer(bytes[0] as i64), bytes[0] as i64, Some(state.label()))
            }
            FieldKind::PwmFrequency => {
                (SignalValue::Integer(bytes[0] as i64), bytes[0] as i64, None)
            }
            FieldKind::RelayState => (SignalValue::Flags(bytes[0] as u32), bytes[0] as i64, None),
            FieldKind::PowerTimer => {
                let ticks = decode_u32(bytes);
                let seconds = ticks as f64 * TIMER_TICK_SECONDS;
                (SignalValue::Float(seconds), ticks as i64, None)
            }
            scaled => {
                // Every remaining kind is a ÷N signed 16-bit quantity
                let divisor = scaled.divisor().unwrap_or(1.0);
                let raw = LittleEndian::read_i16(bytes);
                (SignalValue::Float(decode_signed_scaled(bytes, divisor)), raw as i64, None)
            }
        };

        DecodedSignal {
            name,
            value,
            unit: self.unit(),
            value_description,
            raw_value,
        }
    }
}
