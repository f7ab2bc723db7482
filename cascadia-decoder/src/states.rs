//! VSM and inverter state enumerators
//!
//! Both mappings are total: any code outside the known table becomes
//! `Unknown(code)` and renders as "Unknown state".

use serde::Serialize;
use std::fmt;

/// Label for any code outside the known tables
pub const UNKNOWN_STATE: &str = "Unknown state";

/// Vehicle state machine lifecycle state (Internal States byte 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VsmState {
    Start,
    PrechargeInit,
    PrechargeActive,
    PrechargeComplete,
    Wait,
    Ready,
    MotorRunning,
    BlinkFaultCode,
    ShutdownInProcess,
    RecyclePower,
    Unknown(u8),
}

impl From<u8> for VsmState {
    fn from(code: u8) -> VsmState {
        match code {
            0 => VsmState::Start,
            1 => VsmState::PrechargeInit,
            2 => VsmState::PrechargeActive,
            3 => VsmState::PrechargeComplete,
            4 => VsmState::Wait,
            5 => VsmState::Ready,
            6 => VsmState::MotorRunning,
            7 => VsmState::BlinkFaultCode,
            14 => VsmState::ShutdownInProcess,
            15 => VsmState::RecyclePower,
            other => VsmState::Unknown(other),
        }
    }
}

impl VsmState {
    pub fn code(&self) -> u8 {
        match self {
            VsmState::Start => 0,
            VsmState::PrechargeInit => 1,
            VsmState::PrechargeActive => 2,
            VsmState::PrechargeComplete => 3,
            VsmState::Wait => 4,
            VsmState::Ready => 5,
            VsmState::MotorRunning => 6,
            VsmState::BlinkFaultCode => 7,
            VsmState::ShutdownInProcess => 14,
            VsmState::RecyclePower => 15,
            VsmState::Unknown(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VsmState::Start => "VSM Start State",
            VsmState::PrechargeInit => "Pre-charge Init State",
            VsmState::PrechargeActive => "Pre-charge Active State",
            VsmState::PrechargeComplete => "Pre-charge Complete State",
            VsmState::Wait => "VSM Wait State",
            VsmState::Ready => "VSM Ready State",
            VsmState::MotorRunning => "Motor Running State",
            VsmState::BlinkFaultCode => "Blink Fault Code State",
            VsmState::ShutdownInProcess => "Shutdown in Process",
            VsmState::RecyclePower => "Recycle Power State",
            VsmState::Unknown(_) => UNKNOWN_STATE,
        }
    }
}

impl fmt::Display for VsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Power stage operating mode (Internal States byte 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InverterState {
    PowerOn,
    Stop,
    OpenLoop,
    ClosedLoop,
    Wait,
    IdleRun,
    IdleStop,
    Unknown(u8),
}

impl From<u8> for InverterState {
    fn from(code: u8) -> InverterState {
        match code {
            0 => InverterState::PowerOn,
            1 => InverterState::Stop,
            2 => InverterState::OpenLoop,
            3 => InverterState::ClosedLoop,
            4 => InverterState::Wait,
            8 => InverterState::IdleRun,
            9 => InverterState::IdleStop,
            other => InverterState::Unknown(other),
        }
    }
}

impl InverterState {
    pub fn code(&self) -> u8 {
        match self {
            InverterState::PowerOn => 0,
            InverterState::Stop => 1,
            InverterState::OpenLoop => 2,
            InverterState::ClosedLoop => 3,
            InverterState::Wait => 4,
            InverterState::IdleRun => 8,
            InverterState::IdleStop => 9,
            InverterState::Unknown(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InverterState::PowerOn => "Power on State",
            InverterState::Stop => "Stop State",
            InverterState::OpenLoop => "Open Loop State",
            InverterState::ClosedLoop => "Closed Loop State",
            InverterState::Wait => "Wait State",
            InverterState::IdleRun => "Idle Run State",
            InverterState::IdleStop => "Idle Stop State",
            InverterState::Unknown(_) => UNKNOWN_STATE,
        }
    }
}

impl fmt::Display for InverterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for a raw VSM state code
pub fn vsm_state_description(code: u8) -> &'static str {
    VsmState::from(code).label()
}

/// Label for a raw inverter state code
pub fn inverter_state_description(code: u8) -> &'static str {
    InverterState::from(code).label()
}
