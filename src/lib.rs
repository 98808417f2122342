//! Dynamixel 1.0 protocol engine for half-duplex servo buses.
//!
//! The crate is built in layers:
//! - [`packet`] computes checksums, builds frames and decodes contiguous packets.
//! - [`Transceiver`] drives a polled [`Line`], tracks the single request in
//!   flight and validates its reply.
//! - [`Registry`] enumerates the devices of one class and mirrors a window of
//!   their control tables, which [`Registry::sync_write`] pushes back out in
//!   one broadcast packet.
//!
//! ```no_run
//! # use dxl_proto::{Line, Registry, SpinCountdown, Transceiver};
//! # use dxl_proto::devices::ax12;
//! # fn run(uart: impl Line) -> Result<(), dxl_proto::registry::Error> {
//! let mut bus = Transceiver::new(uart, SpinCountdown::default());
//! let mut servos = Registry::<{ ax12::MAX_ATTACHED }>::new(&ax12::LAYOUT);
//! servos.enumerate(&mut bus);
//! for slot in 0..servos.len() {
//!     if let Some(servo) = servos.device_mut(slot) {
//!         ax12::set_goal_position(servo, 512);
//!     }
//! }
//! servos.sync_write(&mut bus, ax12::reg::GOAL_POSITION_L, ax12::reg::GOAL_POSITION_H)?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod buffer;
pub mod devices;
pub mod layout;
pub mod line;
mod nom_parser;
pub mod packet;
pub mod registry;
pub mod sync_write;
pub mod transceiver;
pub mod types;

pub use layout::{Field, TableLayout, Width};
pub use line::{Countdown, Direction, Line, SpinCountdown};
pub use packet::{checksum, parse_packet, Packet, Parsed};
pub use registry::{Device, Registry};
pub use transceiver::Transceiver;
pub use types::{id, Id, Instruction, Status};

#[cfg(feature = "std")]
pub use line::Deadline;
