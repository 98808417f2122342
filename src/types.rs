//! This module defines range-checked types for bus ids, instructions and
//! device status bytes, meant to simplify correct usage of the API.

use snafu::{ensure, OptionExt, Snafu};

use core::convert::{TryFrom, TryInto};
use core::fmt;
use core::ops::Deref;

/// Error type for this module
#[derive(Debug, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The value isn't a valid bus id.
    #[snafu(display("Invalid id"))]
    InvalidId,
    /// The byte isn't a known instruction code.
    #[snafu(display("Unknown instruction {:#04x}", code))]
    UnknownInstruction { code: u8 },
}

const fn invalid_id() -> InvalidIdSnafu {
    InvalidIdSnafu
}

/// Id is a range-checked [0, 0xFE] integer, representing a device address on the bus.
///
/// `0xFE` is the broadcast id; devices never answer a request sent to it.
///
/// ## Example
/// ```
/// use dxl_proto::Id;
/// use std::convert::TryInto;
/// let id = Id::new(12).unwrap();
/// let id: Id = 12.try_into().unwrap();
/// assert!(!id.is_broadcast());
/// assert!(Id::new(0xFF).is_err());
/// ```
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash)]
#[repr(transparent)]
pub struct Id(u8);

/// Create a new [`Id`], panics if it is out of range.
pub const fn id(i: u8) -> Id {
    if i <= Id::BROADCAST.0 {
        return Id(i);
    }
    panic!("Invalid id.")
}

impl Id {
    /// The broadcast id.
    pub const BROADCAST: Self = Self(0xFE);

    /// Highest id a single device can be assigned.
    pub const MAX_UNICAST: Self = Self(0xFD);

    /// Create a new id, checking that it is in \[0, 0xFE\].
    /// # Errors
    /// Returns [`Error::InvalidId`] if `id` is out of range.
    pub fn new(id: impl TryInto<u8>) -> Result<Self, Error> {
        let id = id.try_into().ok().with_context(invalid_id)?;
        ensure!(id <= Self::BROADCAST.0, invalid_id());
        Ok(Self(id))
    }

    /// True for the broadcast id.
    pub const fn is_broadcast(self) -> bool {
        self.0 == Self::BROADCAST.0
    }

    /// Every id a single device can answer on, in ascending order.
    pub fn unicast() -> impl Iterator<Item = Self> {
        (0..=Self::MAX_UNICAST.0).map(Id)
    }
}

impl Deref for Id {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq<u8> for Id {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl TryFrom<usize> for Id {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Id> for u8 {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_broadcast() {
            f.write_str("broadcast")
        } else {
            fmt::Display::fmt(&self.0, f)
        }
    }
}

#[cfg(test)]
mod id_tests {
    use super::{id, Id};

    #[test]
    fn test_valid_ids() {
        for n in 0..=0xFE {
            let i = Id::new(n).unwrap();
            assert_eq!(*i, n);
        }
        assert!(Id::new(0xFF).is_err());
        assert!(Id::new(-1).is_err());
        assert!(Id::new(300).is_err());
    }

    #[test]
    fn test_broadcast() {
        assert!(id(0xFE).is_broadcast());
        assert!(!id(0xFD).is_broadcast());
        assert_eq!(Id::BROADCAST, 0xFE);
    }

    #[test]
    fn test_unicast_range() {
        let mut all = Id::unicast();
        assert_eq!(all.next(), Some(id(0)));
        assert_eq!(all.last(), Some(Id::MAX_UNICAST));
        assert_eq!(Id::unicast().count(), 254);
        assert!(Id::unicast().all(|i| !i.is_broadcast()));
    }
}

/// Instruction codes understood by protocol 1.0 devices.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
#[repr(u8)]
pub enum Instruction {
    Ping = 0x01,
    ReadData = 0x02,
    WriteData = 0x03,
    /// Write, but hold the value until an `Action` arrives.
    RegWrite = 0x04,
    Action = 0x05,
    /// Restore the factory control table.
    Reset = 0x06,
    DigitalReset = 0x07,
    SystemRead = 0x0C,
    SystemWrite = 0x0D,
    SyncWrite = 0x83,
    SyncRegWrite = 0x84,
}

impl Instruction {
    /// The on-wire instruction byte.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Instruction {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        use Instruction::*;
        Ok(match code {
            0x01 => Ping,
            0x02 => ReadData,
            0x03 => WriteData,
            0x04 => RegWrite,
            0x05 => Action,
            0x06 => Reset,
            0x07 => DigitalReset,
            0x0C => SystemRead,
            0x0D => SystemWrite,
            0x83 => SyncWrite,
            0x84 => SyncRegWrite,
            _ => return UnknownInstructionSnafu { code }.fail(),
        })
    }
}

/// The error byte of a status packet. Zero means the device is happy.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Default)]
#[repr(transparent)]
pub struct Status(u8);

impl Status {
    pub const INPUT_VOLTAGE: u8 = 1 << 0;
    pub const ANGLE_LIMIT: u8 = 1 << 1;
    pub const OVERHEATING: u8 = 1 << 2;
    pub const RANGE: u8 = 1 << 3;
    pub const CHECKSUM: u8 = 1 << 4;
    pub const OVERLOAD: u8 = 1 << 5;
    pub const INSTRUCTION: u8 = 1 << 6;

    const NAMES: [(u8, &'static str); 7] = [
        (Self::INPUT_VOLTAGE, "input voltage"),
        (Self::ANGLE_LIMIT, "angle limit"),
        (Self::OVERHEATING, "overheating"),
        (Self::RANGE, "range"),
        (Self::CHECKSUM, "checksum"),
        (Self::OVERLOAD, "overload"),
        (Self::INSTRUCTION, "instruction"),
    ];

    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `flags` is set.
    pub const fn contains(self, flags: u8) -> bool {
        self.0 & flags == flags
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({:#04x})", self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("ok");
        }
        let mut sep = "";
        for (flag, name) in Self::NAMES.iter() {
            if self.contains(*flag) {
                write!(f, "{}{}", sep, name)?;
                sep = ", ";
            }
        }
        if self.0 & 0x80 != 0 {
            write!(f, "{}unknown", sep)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod instruction_tests {
    use super::*;

    #[test]
    fn test_instruction_codes() {
        assert_eq!(Instruction::Ping.code(), 0x01);
        assert_eq!(Instruction::SyncWrite.code(), 0x83);
        assert_eq!(Instruction::try_from(0x84), Ok(Instruction::SyncRegWrite));
        assert_eq!(
            Instruction::try_from(0x42),
            Err(Error::UnknownInstruction { code: 0x42 })
        );
    }

    #[test]
    fn test_status_flags() {
        let status = Status::new(Status::OVERHEATING | Status::OVERLOAD);
        assert!(!status.is_ok());
        assert!(status.contains(Status::OVERLOAD));
        assert!(!status.contains(Status::RANGE));
        assert_eq!(std::format!("{}", status), "overheating, overload");
        assert_eq!(std::format!("{}", Status::default()), "ok");
    }
}
