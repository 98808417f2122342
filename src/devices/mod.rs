//! Control table layouts of the devices found on a Bioloid bus.

pub mod ax12;
pub mod axs1;
