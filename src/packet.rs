//! Checksums, packet framing and decoding of contiguous packets.
//!
//! Every packet on the bus has the same shape:
//!
//! ```text
//! 0xFF 0xFF <id> <length> <code> <param_0> .. <param_n-1> <checksum>
//! ```
//!
//! where `code` is the instruction in a request and the device status in a
//! reply, `length = n + 2` and `checksum = !(id + length + code + Σ params)`.

use arrayvec::ArrayVec;
use snafu::{ensure, Snafu};

use crate::nom_parser;
use crate::types::{Id, Instruction, Status};

/// Two byte marker starting every packet.
pub const SYNC: [u8; 2] = [0xFF, 0xFF];

/// Sync marker, id, length, code.
pub const HEADER_LEN: usize = 5;

/// Bytes of a packet that carries no parameters.
pub const OVERHEAD: usize = HEADER_LEN + 1;

/// Longest frame that fits the transmit ring buffer with one byte to spare.
pub const MAX_FRAME_LEN: usize = crate::buffer::CAPACITY - 1;

/// Most parameters a single packet can carry.
pub const MAX_PARAMETERS: usize = MAX_FRAME_LEN - OVERHEAD;

/// A complete packet, ready to be written to the line.
pub type Frame = ArrayVec<u8, MAX_FRAME_LEN>;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display(
        "{} parameters don't fit in one packet, the limit is {}",
        count,
        MAX_PARAMETERS
    ))]
    TooManyParameters { count: usize },
}

/// One's complement of the byte sum of everything between the sync marker and the checksum.
pub fn checksum(id: u8, length: u8, code: u8, parameters: &[u8]) -> u8 {
    !parameters
        .iter()
        .fold(id.wrapping_add(length).wrapping_add(code), |sum, byte| {
            sum.wrapping_add(*byte)
        })
}

/// Value of the length field for a packet with `parameter_count` parameters.
pub(crate) const fn length_field(parameter_count: usize) -> u8 {
    (parameter_count + 2) as u8
}

/// Build an instruction packet.
/// # Errors
/// [`Error::TooManyParameters`] if `parameters` is longer than [`MAX_PARAMETERS`].
pub fn frame(id: Id, instruction: Instruction, parameters: &[u8]) -> Result<Frame, Error> {
    frame_raw(*id, instruction.code(), parameters)
}

/// Build a status packet, the way a device answers a request.
/// # Errors
/// [`Error::TooManyParameters`] if `parameters` is longer than [`MAX_PARAMETERS`].
pub fn status_frame(id: Id, status: Status, parameters: &[u8]) -> Result<Frame, Error> {
    frame_raw(*id, status.bits(), parameters)
}

fn frame_raw(id: u8, code: u8, parameters: &[u8]) -> Result<Frame, Error> {
    ensure!(
        parameters.len() <= MAX_PARAMETERS,
        TooManyParametersSnafu {
            count: parameters.len()
        }
    );
    let length = length_field(parameters.len());

    let mut frame = Frame::new();
    frame.extend(SYNC.iter().copied());
    frame.extend([id, length, code].iter().copied());
    frame.extend(parameters.iter().copied());
    frame.push(checksum(id, length, code, parameters));
    Ok(frame)
}

/// A decoded packet borrowing its parameters from the input buffer.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Packet<'a> {
    pub id: u8,
    /// Instruction byte of a request, status byte of a reply.
    pub code: u8,
    pub parameters: &'a [u8],
}

impl Packet<'_> {
    pub fn instruction(&self) -> Result<Instruction, crate::types::Error> {
        use core::convert::TryFrom;
        Instruction::try_from(self.code)
    }

    pub const fn status(&self) -> Status {
        Status::new(self.code)
    }
}

/// Result of [`parse_packet`].
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed<'a> {
    /// A packet was decoded from the first `consumed` bytes of the buffer.
    Complete { consumed: usize, packet: Packet<'a> },
    /// The buffer holds the start of a packet, but not all of it.
    Incomplete,
    /// The buffer doesn't start with a valid packet. Drop a byte and try again.
    Invalid,
}

/// Decode a packet at the start of `buf`.
///
/// ```
/// use dxl_proto::packet::{frame, parse_packet, Parsed};
/// use dxl_proto::{id, Instruction};
///
/// let frame = frame(id(1), Instruction::ReadData, &[0x24, 2]).unwrap();
/// assert_eq!(frame.as_slice(), &[0xFF, 0xFF, 0x01, 0x04, 0x02, 0x24, 0x02, 0xD2]);
/// match parse_packet(&frame) {
///     Parsed::Complete { consumed, packet } => {
///         assert_eq!(consumed, frame.len());
///         assert_eq!(packet.id, 1);
///         assert_eq!(packet.parameters, &[0x24, 2]);
///     }
///     _ => unreachable!(),
/// }
/// ```
pub fn parse_packet(buf: &[u8]) -> Parsed<'_> {
    nom_parser::parse_packet(buf)
}
