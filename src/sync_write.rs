//! Batched register updates: one broadcast `SYNC_WRITE` carrying the same
//! register window of every device in a registry.

use arrayvec::ArrayVec;
use snafu::{ensure, OptionExt};

use crate::line::{Countdown, Line};
use crate::packet::MAX_PARAMETERS;
use crate::registry::{Error, InvalidRangeSnafu, Registry, SyncWriteTooLargeSnafu};
use crate::transceiver::Transceiver;
use crate::types::{Id, Instruction};

/// Parameter block of a sync write: `first, span`, then `id, data..` per device.
pub type SyncParameters = ArrayVec<u8, MAX_PARAMETERS>;

impl<const N: usize> Registry<N> {
    /// Build the sync write parameters for registers `first..=last` from the mirrors.
    /// # Errors
    /// [`Error::InvalidRange`] if the registers aren't mirrored,
    /// [`Error::SyncWriteTooLarge`] if the block doesn't fit in one packet.
    pub fn build_sync_write(&self, first: u8, last: u8) -> Result<SyncParameters, Error> {
        let window = self.window(first, last)?;
        let span = window.len();
        let devices = self.devices();
        ensure!(
            2 + devices.len() * (1 + span) <= MAX_PARAMETERS,
            SyncWriteTooLargeSnafu {
                devices: devices.len(),
                span
            }
        );

        let mut parameters = SyncParameters::new();
        parameters.push(first);
        parameters.push(span as u8);
        for device in devices {
            let data = device
                .registers(first, last)
                .context(InvalidRangeSnafu {
                    class: self.layout().name,
                    first,
                    last,
                })?;
            parameters.push(*device.id());
            parameters.extend(data.iter().copied());
        }
        Ok(parameters)
    }

    /// Send registers `first..=last` of every device in a single broadcast packet.
    pub fn sync_write<L: Line, C: Countdown>(
        &self,
        bus: &mut Transceiver<L, C>,
        first: u8,
        last: u8,
    ) -> Result<(), Error> {
        let parameters = self.build_sync_write(first, last)?;
        bus.transmit(Id::BROADCAST, Instruction::SyncWrite, &parameters)?;
        Ok(())
    }
}
