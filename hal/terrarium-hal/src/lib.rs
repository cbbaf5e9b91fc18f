//! Terrarium Hardware Abstraction Layer
//!
//! This crate defines the byte-level memory primitives the settings store
//! is built on. Device drivers (I2C EEPROMs, on-chip EEPROM, emulated
//! EEPROM in RAM) implement [`eeprom::ByteStorage`] so the same storage
//! logic runs on any of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  terrarium-core (storage manager)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  terrarium-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  RamEeprom    │       │ terrarium-    │
//! │  (host/sim)   │       │ drivers (AT24)│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`eeprom::ByteStorage`] - Single-byte read/write with a fixed capacity

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod ram;

// Re-export key types at crate root for convenience
pub use eeprom::{ByteStorage, EepromError};
pub use ram::RamEeprom;
