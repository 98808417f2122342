//! In-memory mirrors of the devices of one class, and the bus transactions
//! that keep them in step with the hardware.

use arrayvec::ArrayVec;
use core::ops::Range;
use log::{debug, info};
use snafu::{ensure, OptionExt, Snafu};

use crate::layout::{Field, TableLayout, Width, MAX_SPAN};
use crate::line::{Countdown, Line};
use crate::transceiver::{self, Transceiver};
use crate::types::{Id, Instruction};

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("No device in slot {}", slot))]
    NoSuchDevice { slot: usize },
    #[snafu(display(
        "Registers {:#04x}..={:#04x} aren't mirrored for {}",
        first,
        last,
        class
    ))]
    InvalidRange {
        class: &'static str,
        first: u8,
        last: u8,
    },
    #[snafu(display(
        "Sync write to {} devices, {} bytes each, doesn't fit in one packet",
        devices,
        span
    ))]
    SyncWriteTooLarge { devices: usize, span: usize },
    #[snafu(display(
        "{} spans {} registers, a mirror holds at most {}",
        class,
        span,
        MAX_SPAN
    ))]
    LayoutTooLarge { class: &'static str, span: usize },
    #[snafu(display("Device {} isn't laid out as {}", id, class))]
    ForeignDevice { id: u8, class: &'static str },
    #[snafu(context(false))]
    #[snafu(display("{}", source))]
    Bus { source: transceiver::Error },
}

pub type Mirror = ArrayVec<u8, MAX_SPAN>;

/// One device on the bus and its copy of the tracked control table window.
#[derive(Debug, Clone)]
pub struct Device {
    id: Id,
    layout: &'static TableLayout,
    mirror: Mirror,
}

impl Device {
    /// A device with an all-zero mirror.
    /// # Errors
    /// [`Error::LayoutTooLarge`] if the layout spans more than [`MAX_SPAN`] registers.
    pub fn new(id: Id, layout: &'static TableLayout) -> Result<Self, Error> {
        let span = layout.span();
        ensure!(
            span <= MAX_SPAN,
            LayoutTooLargeSnafu {
                class: layout.name,
                span
            }
        );
        let mut mirror = Mirror::new();
        mirror.extend((0..span).map(|_| 0));
        Ok(Self { id, layout, mirror })
    }

    pub const fn id(&self) -> Id {
        self.id
    }

    pub fn layout(&self) -> &'static TableLayout {
        self.layout
    }

    pub fn mirror(&self) -> &[u8] {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut [u8] {
        &mut self.mirror
    }

    /// Mirrored bytes of the registers `first..=last`.
    pub fn registers(&self, first: u8, last: u8) -> Option<&[u8]> {
        let window = self.layout.window(first, last)?;
        self.mirror.get(window)
    }

    pub fn registers_mut(&mut self, first: u8, last: u8) -> Option<&mut [u8]> {
        let window = self.layout.window(first, last)?;
        self.mirror.get_mut(window)
    }

    /// Value of `field`, or `None` if it lies outside the mirrored window.
    pub fn get(&self, field: &Field) -> Option<u16> {
        let bytes = self.registers(field.address, field.last()?)?;
        Some(match field.width {
            Width::Byte => u16::from(bytes[0]),
            Width::Word => u16::from_le_bytes([bytes[0], bytes[1]]),
        })
    }

    /// Store `value` in the mirror. Returns false if the field isn't mirrored.
    /// Byte fields keep the low byte.
    pub fn set(&mut self, field: &Field, value: u16) -> bool {
        let width = field.width;
        let bytes = match field.last() {
            Some(last) => self.registers_mut(field.address, last),
            None => None,
        };
        match bytes {
            Some(bytes) => {
                let value = value.to_le_bytes();
                bytes.copy_from_slice(&value[..width.len()]);
                true
            }
            None => false,
        }
    }
}

/// The devices of one class, in the order they were found on the bus.
///
/// `N` is the most devices of the class the registry will hold.
#[derive(Debug)]
pub struct Registry<const N: usize> {
    layout: &'static TableLayout,
    devices: ArrayVec<Device, N>,
}

impl<const N: usize> Registry<N> {
    pub fn new(layout: &'static TableLayout) -> Self {
        Self {
            layout,
            devices: ArrayVec::new(),
        }
    }

    /// A registry holding `devices`, for a bus whose population is known
    /// without a scan. Devices past the capacity are ignored.
    /// # Errors
    /// [`Error::ForeignDevice`] if a device was built with another layout.
    pub fn from_devices(
        layout: &'static TableLayout,
        devices: impl IntoIterator<Item = Device>,
    ) -> Result<Self, Error> {
        let mut registry = Self::new(layout);
        for device in devices.into_iter().take(N) {
            ensure!(
                *device.layout == *layout,
                ForeignDeviceSnafu {
                    id: *device.id,
                    class: layout.name
                }
            );
            registry.devices.push(device);
        }
        Ok(registry)
    }

    pub fn layout(&self) -> &'static TableLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, slot: usize) -> Option<&Device> {
        self.devices.get(slot)
    }

    pub fn device_mut(&mut self, slot: usize) -> Option<&mut Device> {
        self.devices.get_mut(slot)
    }

    /// Slot of the device answering on `id`.
    pub fn slot_of(&self, id: Id) -> Option<usize> {
        self.devices.iter().position(|device| device.id == id)
    }

    pub(crate) fn window(&self, first: u8, last: u8) -> Result<Range<usize>, Error> {
        self.layout.window(first, last).context(InvalidRangeSnafu {
            class: self.layout.name,
            first,
            last,
        })
    }

    /// Scan every unicast id for devices of this class. See [`enumerate_ids`](Self::enumerate_ids).
    pub fn enumerate<L: Line, C: Countdown>(&mut self, bus: &mut Transceiver<L, C>) -> usize {
        self.enumerate_ids(bus, Id::unicast())
    }

    /// Forget all known devices, then ping each of `ids`. Devices that answer
    /// with this class's model number are added and their mirrors filled.
    /// Stops once the registry is full. Returns the number of devices found.
    pub fn enumerate_ids<L: Line, C: Countdown>(
        &mut self,
        bus: &mut Transceiver<L, C>,
        ids: impl IntoIterator<Item = Id>,
    ) -> usize {
        self.devices.clear();
        for id in ids {
            if self.devices.is_full() {
                break;
            }
            if id.is_broadcast() {
                continue;
            }
            match self.probe(bus, id) {
                Ok(Some(device)) => {
                    debug!("{} at id {}", self.layout.name, id);
                    self.devices.push(device);
                }
                Ok(None) => {}
                Err(err) => debug!("Skipping id {}: {}", id, err),
            }
        }
        info!("Found {} {} devices", self.devices.len(), self.layout.name);
        self.devices.len()
    }

    fn probe<L: Line, C: Countdown>(
        &self,
        bus: &mut Transceiver<L, C>,
        id: Id,
    ) -> Result<Option<Device>, Error> {
        bus.ping(id)?;
        let model = bus.model_number(id)?;
        if model != self.layout.model_number {
            debug!("id {} is model {:#06x}, not {}", id, model, self.layout.name);
            return Ok(None);
        }
        let mut device = Device::new(id, self.layout)?;
        bus.read(id, self.layout.first, device.mirror_mut())?;
        Ok(Some(device))
    }

    /// Refresh registers `first..=last` of the device in `slot` from the bus.
    /// The mirror is left untouched if the transaction fails.
    pub fn get_range<L: Line, C: Countdown>(
        &mut self,
        bus: &mut Transceiver<L, C>,
        slot: usize,
        first: u8,
        last: u8,
    ) -> Result<(), Error> {
        self.window(first, last)?;
        let class = self.layout.name;
        let device = self
            .devices
            .get_mut(slot)
            .context(NoSuchDeviceSnafu { slot })?;
        let id = device.id;
        let out = device
            .registers_mut(first, last)
            .context(InvalidRangeSnafu { class, first, last })?;
        bus.read(id, first, out)?;
        Ok(())
    }

    /// Write registers `first..=last` of the device in `slot` from its mirror.
    pub fn set_range<L: Line, C: Countdown>(
        &self,
        bus: &mut Transceiver<L, C>,
        slot: usize,
        first: u8,
        last: u8,
    ) -> Result<(), Error> {
        self.window(first, last)?;
        let device = self.devices.get(slot).context(NoSuchDeviceSnafu { slot })?;
        let data = device
            .registers(first, last)
            .context(InvalidRangeSnafu {
                class: self.layout.name,
                first,
                last,
            })?;
        bus.write(device.id, first, data)?;
        Ok(())
    }

    /// [`get_range`](Self::get_range) for every device, stopping at the first failure.
    pub fn get_range_all<L: Line, C: Countdown>(
        &mut self,
        bus: &mut Transceiver<L, C>,
        first: u8,
        last: u8,
    ) -> Result<(), Error> {
        for slot in 0..self.devices.len() {
            self.get_range(bus, slot, first, last)?;
        }
        Ok(())
    }

    /// [`set_range`](Self::set_range) for every device, stopping at the first failure.
    pub fn set_range_all<L: Line, C: Countdown>(
        &self,
        bus: &mut Transceiver<L, C>,
        first: u8,
        last: u8,
    ) -> Result<(), Error> {
        for slot in 0..self.devices.len() {
            self.set_range(bus, slot, first, last)?;
        }
        Ok(())
    }

    /// Write the same values to every device on the bus at once.
    ///
    /// `parameters` is the start register followed by the data, as in a
    /// `WRITE_DATA` request. Nobody replies.
    pub fn broadcast_write<L: Line, C: Countdown>(
        &self,
        bus: &mut Transceiver<L, C>,
        parameters: &[u8],
    ) -> Result<(), Error> {
        bus.transmit(Id::BROADCAST, Instruction::WriteData, parameters)?;
        Ok(())
    }
}
