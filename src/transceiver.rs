//! Packet transmission and reception over a half-duplex [`Line`].
//!
//! Only one unicast request can be in flight. [`Transceiver::transmit`]
//! records how many reply bytes the request will produce, and
//! [`Transceiver::receive`] collects exactly that many bytes before it
//! validates the reply.

use arrayvec::ArrayVec;
use log::{debug, trace, warn};
use snafu::Snafu;

use crate::buffer::RingBuffer;
use crate::line::{Countdown, Direction, Line};
use crate::packet::{self, MAX_PARAMETERS, OVERHEAD, SYNC};
use crate::types::{Id, Instruction, Status};

/// Control table address of the two byte model number, common to every device.
pub const MODEL_NUMBER: u8 = 0x00;

/// Ways a transaction can fail. A successful reception is `Ok`.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The device answered, but reported a fault in its status byte.
    #[snafu(display("Device reported {}", status))]
    Device { status: Status },
    /// The line went quiet while reply bytes were still expected.
    #[snafu(display("Timed out waiting for {} more bytes", missing))]
    Timeout { missing: u16 },
    /// No sync marker in the buffered bytes.
    #[snafu(display("No packet header found"))]
    Header,
    #[snafu(display("Reply from id {}, expected {}", received, expected))]
    Id { expected: u8, received: u8 },
    #[snafu(display("Reply length {}, expected {}", received, expected))]
    Length { expected: u8, received: u8 },
    #[snafu(display("Checksum {:#04x}, expected {:#04x}", received, expected))]
    Checksum { expected: u8, received: u8 },
    #[snafu(context(false))]
    #[snafu(display("{}", source))]
    Packet { source: packet::Error },
}

/// Reply size for a request, or zero for requests nobody answers.
fn expected_reply_len(id: Id, instruction: Instruction, parameters: &[u8]) -> u16 {
    if id.is_broadcast() {
        return 0;
    }
    match instruction {
        Instruction::Ping | Instruction::WriteData => OVERHEAD as u16,
        Instruction::ReadData => {
            OVERHEAD as u16 + u16::from(parameters.get(1).copied().unwrap_or(0))
        }
        _ => 0,
    }
}

fn too_many_parameters(count: usize) -> Error {
    Error::Packet {
        source: packet::Error::TooManyParameters { count },
    }
}

/// Owns the line, both ring buffers and the count of reply bytes still owed by the bus.
pub struct Transceiver<L, C> {
    line: L,
    countdown: C,
    tx: RingBuffer,
    rx: RingBuffer,
    outstanding: u16,
}

impl<L: Line, C: Countdown> Transceiver<L, C> {
    pub fn new(line: L, countdown: C) -> Self {
        Self {
            line,
            countdown,
            tx: RingBuffer::new(),
            rx: RingBuffer::new(),
            outstanding: 0,
        }
    }

    /// Reply bytes the bus still owes us.
    pub const fn outstanding(&self) -> u16 {
        self.outstanding
    }

    /// Bytes received but not yet consumed by [`receive`](Self::receive).
    pub const fn buffered(&self) -> usize {
        self.rx.occupied()
    }

    pub fn line(&self) -> &L {
        &self.line
    }

    pub fn line_mut(&mut self) -> &mut L {
        &mut self.line
    }

    pub fn into_line(self) -> L {
        self.line
    }

    /// Frame a request and write it to the line, blocking until the last byte is out.
    ///
    /// A reply left unclaimed by the previous request is collected and thrown away first.
    /// # Errors
    /// [`Error::Packet`] if `parameters` doesn't fit in one packet.
    pub fn transmit(
        &mut self,
        id: Id,
        instruction: Instruction,
        parameters: &[u8],
    ) -> Result<(), Error> {
        let frame = packet::frame(id, instruction, parameters)?;

        if self.outstanding > 0 {
            debug!(
                "Dropping unclaimed reply, {} bytes outstanding",
                self.outstanding
            );
            self.line.set_direction(Direction::Receive);
            if let Err(err) = self.collect() {
                debug!("Unclaimed reply cut short: {}", err);
            }
            self.rx.clear();
        }

        while self.tx.free() < frame.len() + 1 {
            self.flush();
        }

        self.outstanding += expected_reply_len(id, instruction, parameters);

        trace!(
            "tx id {} {:?} with {} parameters",
            id,
            instruction,
            parameters.len()
        );
        self.tx.extend_from_slice(&frame);
        self.line.set_direction(Direction::Transmit);
        self.flush();
        Ok(())
    }

    fn flush(&mut self) {
        while let Some(byte) = self.tx.pop() {
            self.line.write_byte(byte);
            while !self.line.transmit_empty() {}
        }
    }

    /// Wait for the reply to the last request and validate it, copying its
    /// parameters into `parameters`. The reply must carry exactly
    /// `parameters.len()` parameter bytes.
    ///
    /// `parameters` is only written when the whole reply is valid.
    pub fn receive(&mut self, id: Id, parameters: &mut [u8]) -> Result<(), Error> {
        let result = self.receive_inner(*id, parameters);
        match &result {
            // silence is the normal answer from an empty address
            Err(err @ Error::Timeout { .. }) => debug!("rx from id {}: {}", id, err),
            Err(err) => warn!("rx from id {} failed: {}", id, err),
            Ok(()) => {}
        }
        result
    }

    fn receive_inner(&mut self, id: u8, out: &mut [u8]) -> Result<(), Error> {
        if out.len() > MAX_PARAMETERS {
            return Err(too_many_parameters(out.len()));
        }

        self.line.set_direction(Direction::Receive);
        self.collect()?;

        // Unlike every other failure, a missing header leaves the buffer
        // alone so the next call continues the scan from here.
        loop {
            match (self.rx.peek(0), self.rx.peek(1)) {
                (Some(0xFF), Some(0xFF)) => break,
                (Some(_), Some(_)) => {
                    self.rx.pop();
                }
                _ => return HeaderSnafu.fail(),
            }
        }
        for _ in SYNC.iter() {
            self.rx.pop();
        }

        let received = self.take().unwrap_or(!id);
        if received != id {
            return self.abort(IdSnafu {
                expected: id,
                received,
            });
        }

        let expected = packet::length_field(out.len());
        let length = self.take().unwrap_or(0);
        if length != expected {
            return self.abort(LengthSnafu {
                expected,
                received: length,
            });
        }

        let status = Status::new(self.take().unwrap_or(0));
        if !status.is_ok() {
            return self.abort(DeviceSnafu { status });
        }

        let mut payload = ArrayVec::<u8, MAX_PARAMETERS>::new();
        while payload.len() < out.len() {
            match self.take() {
                Some(byte) => payload.push(byte),
                None => {
                    return self.abort(LengthSnafu {
                        expected,
                        received: packet::length_field(payload.len()),
                    })
                }
            }
        }

        let expected = packet::checksum(id, length, status.bits(), &payload);
        match self.take() {
            Some(received) if received == expected => {}
            received => {
                return self.abort(ChecksumSnafu {
                    expected,
                    received: received.unwrap_or(!expected),
                })
            }
        }

        out.copy_from_slice(&payload);
        Ok(())
    }

    /// Move owed reply bytes from the line into the receive buffer.
    fn collect(&mut self) -> Result<(), Error> {
        while self.outstanding > 0 {
            self.countdown.start();
            let byte = loop {
                if let Some(byte) = self.line.read_byte() {
                    break byte;
                }
                if self.countdown.expired() {
                    let missing = self.outstanding;
                    self.outstanding = 0;
                    self.rx.clear();
                    return TimeoutSnafu { missing }.fail();
                }
            };
            // a full ring would read as empty; lose the oldest byte instead
            if self.rx.free() == 1 {
                self.rx.pop();
            }
            self.rx.push(byte);
            self.outstanding -= 1;
        }
        Ok(())
    }

    fn take(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    fn abort<E: snafu::IntoError<Error, Source = snafu::NoneError>>(
        &mut self,
        context: E,
    ) -> Result<(), Error> {
        self.rx.clear();
        Err(context.into_error(snafu::NoneError))
    }

    /// Check that a device answers on `id`.
    pub fn ping(&mut self, id: Id) -> Result<(), Error> {
        self.transmit(id, Instruction::Ping, &[])?;
        self.receive(id, &mut [])
    }

    /// Read `out.len()` bytes of the control table of `id`, starting at `start`.
    pub fn read(&mut self, id: Id, start: u8, out: &mut [u8]) -> Result<(), Error> {
        if out.len() > MAX_PARAMETERS {
            return Err(too_many_parameters(out.len()));
        }
        self.transmit(id, Instruction::ReadData, &[start, out.len() as u8])?;
        self.receive(id, out)
    }

    /// Write `data` to the control table of `id`, starting at `start`, and
    /// wait for the acknowledgement. Broadcast writes return without waiting.
    pub fn write(&mut self, id: Id, start: u8, data: &[u8]) -> Result<(), Error> {
        let mut parameters = ArrayVec::<u8, MAX_PARAMETERS>::new();
        parameters.push(start);
        parameters
            .try_extend_from_slice(data)
            .map_err(|_| too_many_parameters(data.len() + 1))?;
        self.transmit(id, Instruction::WriteData, &parameters)?;
        if id.is_broadcast() {
            return Ok(());
        }
        self.receive(id, &mut [])
    }

    /// Read the model number register of `id`.
    pub fn model_number(&mut self, id: Id) -> Result<u16, Error> {
        let mut model = [0; 2];
        self.read(id, MODEL_NUMBER, &mut model)?;
        Ok(u16::from_le_bytes(model))
    }
}
