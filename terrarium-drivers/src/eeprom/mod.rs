//! EEPROM drivers

pub mod at24;

pub use at24::{AddressMode, At24, At24Variant};
