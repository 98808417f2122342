//! AX-S1 sensor module.

use crate::layout::{Field, TableLayout};

pub const MODEL_NUMBER: u16 = 0x000D;

pub const MAX_ATTACHED: usize = 1;

/// Control table addresses.
pub mod reg {
    pub const MODEL_NUMBER: u8 = 0x00;
    pub const ID: u8 = 0x03;
    pub const OBSTACLE_DETECTED_COMPARE_VALUE: u8 = 0x14;
    pub const LIGHT_DETECTED_COMPARE_VALUE: u8 = 0x15;
    pub const LEFT_IR_SENSOR_DATA: u8 = 0x1A;
    pub const CENTER_IR_SENSOR_DATA: u8 = 0x1B;
    pub const RIGHT_IR_SENSOR_DATA: u8 = 0x1C;
    pub const LEFT_LUMINOSITY: u8 = 0x1D;
    pub const CENTER_LUMINOSITY: u8 = 0x1E;
    pub const RIGHT_LUMINOSITY: u8 = 0x1F;
    pub const OBSTACLE_DETECTION_FLAG: u8 = 0x20;
    pub const LUMINOSITY_DETECTION_FLAG: u8 = 0x21;
    pub const SOUND_DATA: u8 = 0x23;
    pub const SOUND_DATA_MAX_HOLD: u8 = 0x24;
    pub const SOUND_DETECTED_COUNT: u8 = 0x25;
    pub const SOUND_DETECTED_TIME_L: u8 = 0x26;
    pub const SOUND_DETECTED_TIME_H: u8 = 0x27;
    pub const BUZZER_INDEX: u8 = 0x28;
    pub const BUZZER_TIME: u8 = 0x29;
    pub const PRESENT_VOLTAGE: u8 = 0x2A;
    pub const PRESENT_TEMPERATURE: u8 = 0x2B;
    pub const REGISTERED_INSTRUCTION: u8 = 0x2C;
    pub const IR_REMOCON_ARRIVED: u8 = 0x2E;
    pub const LOCK: u8 = 0x2F;
    pub const IR_REMOCON_RX_DATA_0: u8 = 0x30;
    pub const IR_REMOCON_RX_DATA_1: u8 = 0x31;
    pub const IR_REMOCON_TX_DATA_0: u8 = 0x32;
    pub const IR_REMOCON_TX_DATA_1: u8 = 0x33;
    pub const OBSTACLE_DETECTED_COMPARE: u8 = 0x34;
    pub const LIGHT_DETECTED_COMPARE: u8 = 0x35;
}

pub const OBSTACLE_DETECTED_COMPARE_VALUE: Field =
    Field::byte("obstacle_compare_value", reg::OBSTACLE_DETECTED_COMPARE_VALUE);
pub const LIGHT_DETECTED_COMPARE_VALUE: Field =
    Field::byte("light_compare_value", reg::LIGHT_DETECTED_COMPARE_VALUE);
pub const LEFT_IR_SENSOR_DATA: Field = Field::byte("left_ir", reg::LEFT_IR_SENSOR_DATA);
pub const CENTER_IR_SENSOR_DATA: Field = Field::byte("center_ir", reg::CENTER_IR_SENSOR_DATA);
pub const RIGHT_IR_SENSOR_DATA: Field = Field::byte("right_ir", reg::RIGHT_IR_SENSOR_DATA);
pub const LEFT_LUMINOSITY: Field = Field::byte("left_luminosity", reg::LEFT_LUMINOSITY);
pub const CENTER_LUMINOSITY: Field = Field::byte("center_luminosity", reg::CENTER_LUMINOSITY);
pub const RIGHT_LUMINOSITY: Field = Field::byte("right_luminosity", reg::RIGHT_LUMINOSITY);
pub const OBSTACLE_DETECTION_FLAG: Field =
    Field::byte("obstacle_detection_flag", reg::OBSTACLE_DETECTION_FLAG);
pub const LUMINOSITY_DETECTION_FLAG: Field =
    Field::byte("luminosity_detection_flag", reg::LUMINOSITY_DETECTION_FLAG);
pub const SOUND_DATA: Field = Field::byte("sound_data", reg::SOUND_DATA);
pub const SOUND_DATA_MAX_HOLD: Field = Field::byte("sound_data_max_hold", reg::SOUND_DATA_MAX_HOLD);
pub const SOUND_DETECTED_COUNT: Field = Field::byte("sound_detected_count", reg::SOUND_DETECTED_COUNT);
pub const SOUND_DETECTED_TIME: Field = Field::word("sound_detected_time", reg::SOUND_DETECTED_TIME_L);
pub const BUZZER_INDEX: Field = Field::byte("buzzer_index", reg::BUZZER_INDEX);
pub const BUZZER_TIME: Field = Field::byte("buzzer_time", reg::BUZZER_TIME);
pub const PRESENT_VOLTAGE: Field = Field::byte("present_voltage", reg::PRESENT_VOLTAGE);
pub const PRESENT_TEMPERATURE: Field = Field::byte("present_temperature", reg::PRESENT_TEMPERATURE);
pub const REGISTERED_INSTRUCTION: Field =
    Field::byte("registered_instruction", reg::REGISTERED_INSTRUCTION);
pub const IR_REMOCON_ARRIVED: Field = Field::byte("ir_remocon_arrived", reg::IR_REMOCON_ARRIVED);
pub const LOCK: Field = Field::byte("lock", reg::LOCK);
pub const IR_REMOCON_RX_DATA: Field = Field::word("ir_remocon_rx", reg::IR_REMOCON_RX_DATA_0);
pub const IR_REMOCON_TX_DATA: Field = Field::word("ir_remocon_tx", reg::IR_REMOCON_TX_DATA_0);
pub const OBSTACLE_DETECTED_COMPARE: Field =
    Field::byte("obstacle_detected_compare", reg::OBSTACLE_DETECTED_COMPARE);
pub const LIGHT_DETECTED_COMPARE: Field =
    Field::byte("light_detected_compare", reg::LIGHT_DETECTED_COMPARE);

const FIELDS: [Field; 25] = [
    OBSTACLE_DETECTED_COMPARE_VALUE,
    LIGHT_DETECTED_COMPARE_VALUE,
    LEFT_IR_SENSOR_DATA,
    CENTER_IR_SENSOR_DATA,
    RIGHT_IR_SENSOR_DATA,
    LEFT_LUMINOSITY,
    CENTER_LUMINOSITY,
    RIGHT_LUMINOSITY,
    OBSTACLE_DETECTION_FLAG,
    LUMINOSITY_DETECTION_FLAG,
    SOUND_DATA,
    SOUND_DATA_MAX_HOLD,
    SOUND_DETECTED_COUNT,
    SOUND_DETECTED_TIME,
    BUZZER_INDEX,
    BUZZER_TIME,
    PRESENT_VOLTAGE,
    PRESENT_TEMPERATURE,
    REGISTERED_INSTRUCTION,
    IR_REMOCON_ARRIVED,
    LOCK,
    IR_REMOCON_RX_DATA,
    IR_REMOCON_TX_DATA,
    OBSTACLE_DETECTED_COMPARE,
    LIGHT_DETECTED_COMPARE,
];

/// Obstacle compare value through light detected compare.
pub static LAYOUT: TableLayout = TableLayout {
    name: "AX-S1",
    model_number: MODEL_NUMBER,
    first: reg::OBSTACLE_DETECTED_COMPARE_VALUE,
    last: reg::LIGHT_DETECTED_COMPARE,
    fields: &FIELDS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Device;
    use crate::types::id;

    #[test]
    fn test_every_field_is_mirrored() {
        assert_eq!(LAYOUT.span(), 34);
        for field in LAYOUT.fields {
            let last = field.last().unwrap();
            assert!(LAYOUT.window(field.address, last).is_some(), "{}", field.name);
            assert_eq!(LAYOUT.field(field.name), Some(field));
        }
    }

    #[test]
    fn test_status_fields() {
        let mut sensor = Device::new(id(100), &LAYOUT).unwrap();
        let offset = LAYOUT.offset_of(reg::PRESENT_VOLTAGE).unwrap();
        sensor.mirror_mut()[offset] = 120;
        assert_eq!(sensor.get(&PRESENT_VOLTAGE), Some(120));
        assert!(sensor.set(&LOCK, 1));
        assert_eq!(sensor.registers(reg::LOCK, reg::LOCK), Some(&[1][..]));
        assert_eq!(LAYOUT.field("sound_data_max_hold"), Some(&SOUND_DATA_MAX_HOLD));
    }
}
