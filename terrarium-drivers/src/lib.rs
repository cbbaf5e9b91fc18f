//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the
//! [`ByteStorage`](terrarium_hal::ByteStorage) trait for EEPROM parts:
//!
//! - AT24Cxx serial EEPROMs over I2C (AT24C02 through AT24C256)

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
