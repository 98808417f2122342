#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::convert::TryFrom;
use std::rc::Rc;

use dxl_proto::line::{Direction, Line, SpinCountdown};
use dxl_proto::packet::{parse_packet, status_frame, Parsed};
use dxl_proto::{Id, Instruction, Status, Transceiver};

pub const TABLE_LEN: usize = 64;

/// How a simulated device misbehaves when it answers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Answer with the next id up.
    WrongId,
    /// Flip a bit of the trailing checksum.
    Checksum,
    /// Answer with this status byte.
    Status(u8),
    /// Never answer.
    Silent,
}

pub struct SimDevice {
    pub table: [u8; TABLE_LEN],
    pub fault: Fault,
}

impl SimDevice {
    pub fn new(model_number: u16) -> SimDevice {
        let mut table = [0; TABLE_LEN];
        table[..2].copy_from_slice(&model_number.to_le_bytes());
        SimDevice {
            table,
            fault: Fault::None,
        }
    }

    fn write(&mut self, start: u8, data: &[u8]) {
        let start = usize::from(start).min(TABLE_LEN);
        let end = (start + data.len()).min(TABLE_LEN);
        self.table[start..end].copy_from_slice(&data[..end - start]);
    }
}

/// A bus full of simulated devices. Requests are decoded as they are
/// written and replies queued for reading.
#[derive(Default)]
pub struct SimBus {
    pub devices: BTreeMap<u8, SimDevice>,
    /// Every request seen, as raw frames.
    pub requests: Vec<Vec<u8>>,
    pub direction: Option<Direction>,
    pending: Vec<u8>,
    replies: VecDeque<u8>,
}

pub struct SimLine(Rc<RefCell<SimBus>>);

impl SimLine {
    pub fn new(bus: &Rc<RefCell<SimBus>>) -> SimLine {
        SimLine(bus.clone())
    }
}

impl SimBus {
    pub fn new() -> Rc<RefCell<SimBus>> {
        Rc::new(RefCell::new(SimBus::default()))
    }

    pub fn with_devices(devices: &[(u8, u16)]) -> Rc<RefCell<SimBus>> {
        let bus = SimBus::new();
        for (id, model) in devices {
            bus.borrow_mut().attach(*id, *model);
        }
        bus
    }

    pub fn attach(&mut self, id: u8, model_number: u16) {
        self.devices.insert(id, SimDevice::new(model_number));
    }

    pub fn device(&mut self, id: u8) -> &mut SimDevice {
        self.devices.get_mut(&id).expect("no such simulated device")
    }

    /// Queue bytes as if some device had sent them.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.replies.extend(bytes);
    }

    fn decode(&mut self) {
        loop {
            let decoded = match parse_packet(&self.pending) {
                Parsed::Complete { consumed, packet } => Some((
                    consumed,
                    packet.id,
                    packet.code,
                    packet.parameters.to_vec(),
                )),
                Parsed::Incomplete => return,
                Parsed::Invalid => None,
            };
            let (consumed, id, code, parameters) = match decoded {
                Some(decoded) => decoded,
                None => {
                    self.pending.remove(0);
                    continue;
                }
            };
            self.requests.push(self.pending.drain(..consumed).collect());
            if let Ok(instruction) = Instruction::try_from(code) {
                self.execute(id, instruction, &parameters);
            }
        }
    }

    fn execute(&mut self, id: u8, instruction: Instruction, parameters: &[u8]) {
        let broadcast = id == *Id::BROADCAST;
        match instruction {
            Instruction::Ping => self.reply(id, &[]),
            Instruction::ReadData => {
                if let (Some(device), [start, len]) = (self.devices.get(&id), parameters) {
                    let start = usize::from(*start);
                    let data = device.table[start..start + usize::from(*len)].to_vec();
                    self.reply(id, &data);
                }
            }
            Instruction::WriteData => {
                let (start, data) = (parameters[0], &parameters[1..]);
                for (device_id, device) in self.devices.iter_mut() {
                    if broadcast || *device_id == id {
                        device.write(start, data);
                    }
                }
                self.reply(id, &[]);
            }
            Instruction::SyncWrite => {
                let (start, span) = (parameters[0], usize::from(parameters[1]));
                for chunk in parameters[2..].chunks(span + 1) {
                    if let Some(device) = self.devices.get_mut(&chunk[0]) {
                        device.write(start, &chunk[1..]);
                    }
                }
            }
            _ => {}
        }
    }

    fn reply(&mut self, id: u8, parameters: &[u8]) {
        if id == *Id::BROADCAST {
            return;
        }
        let fault = match self.devices.get(&id) {
            Some(device) => device.fault,
            None => return,
        };
        let (reply_id, status) = match fault {
            Fault::Silent => return,
            Fault::WrongId => (id + 1, 0),
            Fault::Status(status) => (id, status),
            Fault::None | Fault::Checksum => (id, 0),
        };
        let mut frame = status_frame(Id::new(reply_id).unwrap(), Status::new(status), parameters)
            .unwrap()
            .to_vec();
        if fault == Fault::Checksum {
            *frame.last_mut().unwrap() ^= 0x01;
        }
        self.replies.extend(frame);
    }
}

impl Line for SimLine {
    fn write_byte(&mut self, byte: u8) {
        let mut bus = self.0.borrow_mut();
        assert_eq!(bus.direction, Some(Direction::Transmit));
        bus.pending.push(byte);
        bus.decode();
    }

    fn transmit_empty(&mut self) -> bool {
        true
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.0.borrow_mut().replies.pop_front()
    }

    fn set_direction(&mut self, direction: Direction) {
        self.0.borrow_mut().direction = Some(direction);
    }
}

pub type SimTransceiver = Transceiver<SimLine, SpinCountdown>;

pub fn open_bus(bus: &Rc<RefCell<SimBus>>) -> SimTransceiver {
    Transceiver::new(SimLine::new(bus), SpinCountdown::new(16))
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
