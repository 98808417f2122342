//! AX-12 servo.

use crate::layout::{Field, TableLayout};
use crate::registry::Device;

pub const MODEL_NUMBER: u16 = 0x000C;

/// Servos a single bus is expected to carry.
pub const MAX_ATTACHED: usize = 18;

/// Control table addresses.
pub mod reg {
    pub const MODEL_NUMBER: u8 = 0x00;
    pub const FIRMWARE_VERSION: u8 = 0x02;
    pub const ID: u8 = 0x03;
    pub const BAUD_RATE: u8 = 0x04;
    pub const RETURN_DELAY_TIME: u8 = 0x05;
    pub const CW_ANGLE_LIMIT: u8 = 0x06;
    pub const CCW_ANGLE_LIMIT: u8 = 0x08;
    pub const HIGH_TEMP_LIMIT: u8 = 0x0B;
    pub const LOW_VOLTAGE_LIMIT: u8 = 0x0C;
    pub const HIGH_VOLTAGE_LIMIT: u8 = 0x0D;
    pub const MAX_TORQUE: u8 = 0x0E;
    pub const STATUS_RETURN_LEVEL: u8 = 0x10;
    pub const ALARM_LED: u8 = 0x11;
    pub const ALARM_SHUTDOWN: u8 = 0x12;
    pub const DOWN_CALIBRATION: u8 = 0x14;
    pub const UP_CALIBRATION: u8 = 0x16;
    pub const TORQUE_ENABLE: u8 = 0x18;
    pub const LED: u8 = 0x19;
    pub const CW_COMPLIANCE_MARGIN: u8 = 0x1A;
    pub const CCW_COMPLIANCE_MARGIN: u8 = 0x1B;
    pub const CW_COMPLIANCE_SLOPE: u8 = 0x1C;
    pub const CCW_COMPLIANCE_SLOPE: u8 = 0x1D;
    pub const GOAL_POSITION_L: u8 = 0x1E;
    pub const GOAL_POSITION_H: u8 = 0x1F;
    pub const MOVING_SPEED_L: u8 = 0x20;
    pub const MOVING_SPEED_H: u8 = 0x21;
    pub const TORQUE_LIMIT_L: u8 = 0x22;
    pub const TORQUE_LIMIT_H: u8 = 0x23;
    pub const PRESENT_POSITION_L: u8 = 0x24;
    pub const PRESENT_POSITION_H: u8 = 0x25;
    pub const PRESENT_SPEED_L: u8 = 0x26;
    pub const PRESENT_SPEED_H: u8 = 0x27;
    pub const PRESENT_LOAD_L: u8 = 0x28;
    pub const PRESENT_LOAD_H: u8 = 0x29;
    pub const PRESENT_VOLTAGE: u8 = 0x2A;
    pub const PRESENT_TEMPERATURE: u8 = 0x2B;
    pub const REGISTERED_INSTRUCTION: u8 = 0x2C;
    pub const MOVING: u8 = 0x2E;
    pub const LOCK: u8 = 0x2F;
    pub const PUNCH: u8 = 0x30;
}

pub const TORQUE_ENABLE: Field = Field::byte("torque_enable", reg::TORQUE_ENABLE);
pub const LED: Field = Field::byte("led", reg::LED);
pub const CW_COMPLIANCE_MARGIN: Field =
    Field::byte("cw_compliance_margin", reg::CW_COMPLIANCE_MARGIN);
pub const CCW_COMPLIANCE_MARGIN: Field =
    Field::byte("ccw_compliance_margin", reg::CCW_COMPLIANCE_MARGIN);
pub const CW_COMPLIANCE_SLOPE: Field = Field::byte("cw_compliance_slope", reg::CW_COMPLIANCE_SLOPE);
pub const CCW_COMPLIANCE_SLOPE: Field =
    Field::byte("ccw_compliance_slope", reg::CCW_COMPLIANCE_SLOPE);
pub const GOAL_POSITION: Field = Field::word("goal_position", reg::GOAL_POSITION_L);
pub const MOVING_SPEED: Field = Field::word("moving_speed", reg::MOVING_SPEED_L);
pub const TORQUE_LIMIT: Field = Field::word("torque_limit", reg::TORQUE_LIMIT_L);
pub const PRESENT_POSITION: Field = Field::word("present_position", reg::PRESENT_POSITION_L);
pub const PRESENT_SPEED: Field = Field::word("present_speed", reg::PRESENT_SPEED_L);
pub const PRESENT_LOAD: Field = Field::word("present_load", reg::PRESENT_LOAD_L);

const FIELDS: [Field; 12] = [
    TORQUE_ENABLE,
    LED,
    CW_COMPLIANCE_MARGIN,
    CCW_COMPLIANCE_MARGIN,
    CW_COMPLIANCE_SLOPE,
    CCW_COMPLIANCE_SLOPE,
    GOAL_POSITION,
    MOVING_SPEED,
    TORQUE_LIMIT,
    PRESENT_POSITION,
    PRESENT_SPEED,
    PRESENT_LOAD,
];

/// Torque enable through present load.
pub static LAYOUT: TableLayout = TableLayout {
    name: "AX-12",
    model_number: MODEL_NUMBER,
    first: reg::TORQUE_ENABLE,
    last: reg::PRESENT_LOAD_H,
    fields: &FIELDS,
};

pub const MAX_POSITION: u16 = 0x3FF;

/// Set the goal position, clamped to the servo's travel.
pub fn set_goal_position(device: &mut Device, position: i32) {
    let position = position.max(0).min(i32::from(MAX_POSITION)) as u16;
    device.set(&GOAL_POSITION, position);
}
