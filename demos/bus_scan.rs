use anyhow::{Context, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

use dxl_proto::devices::{ax12, axs1};
use dxl_proto::{Deadline, Direction, Line, Registry, Transceiver};

/// A USB serial adapter. With `use_rts`, RTS switches an external bus driver.
struct SerialLine {
    port: Box<dyn SerialPort>,
    use_rts: bool,
}

impl Line for SerialLine {
    fn write_byte(&mut self, byte: u8) {
        if let Err(err) = self.port.write_all(&[byte]) {
            log::error!("Serial write failed: {}", err);
        }
    }

    fn transmit_empty(&mut self) -> bool {
        self.port.flush().is_ok()
    }

    fn read_byte(&mut self) -> Option<u8> {
        match self.port.bytes_to_read() {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let mut byte = [0];
                self.port.read_exact(&mut byte).ok()?;
                Some(byte[0])
            }
        }
    }

    fn set_direction(&mut self, direction: Direction) {
        if self.use_rts {
            let _ = self
                .port
                .write_request_to_send(direction == Direction::Transmit);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args();
    args.next(); // Skip program name
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let baud_rate = match args.next() {
        Some(baud) => baud.parse().context("Baud rate must be a number")?,
        None => 1_000_000,
    };
    let use_rts = args.any(|arg| arg == "--rts");

    let serial = serialport::new(&port, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(Duration::from_millis(10))
        .open()
        .with_context(|| format!("Failed to open {}", port))?;
    let line = SerialLine {
        port: serial,
        use_rts,
    };
    let mut bus = Transceiver::new(line, Deadline::new(Duration::from_millis(5)));

    let mut servos = Registry::<{ ax12::MAX_ATTACHED }>::new(&ax12::LAYOUT);
    servos.enumerate(&mut bus);
    for servo in servos.devices() {
        println!(
            "AX-12 {:3}  position {:4}  speed {:4}  load {:4}",
            servo.id(),
            servo.get(&ax12::PRESENT_POSITION).unwrap_or_default(),
            servo.get(&ax12::PRESENT_SPEED).unwrap_or_default(),
            servo.get(&ax12::PRESENT_LOAD).unwrap_or_default(),
        );
    }

    let mut sensors = Registry::<{ axs1::MAX_ATTACHED }>::new(&axs1::LAYOUT);
    sensors.enumerate(&mut bus);
    for sensor in sensors.devices() {
        println!(
            "AX-S1 {:3}  ir {:?}  light {:?}",
            sensor.id(),
            sensor.registers(
                axs1::reg::LEFT_IR_SENSOR_DATA,
                axs1::reg::RIGHT_IR_SENSOR_DATA
            ),
            sensor.registers(axs1::reg::LEFT_LUMINOSITY, axs1::reg::RIGHT_LUMINOSITY),
        );
    }
    Ok(())
}
