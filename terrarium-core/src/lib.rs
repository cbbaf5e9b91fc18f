//! Board-agnostic core logic for the terrarium controller
//!
//! This crate contains the settings record and the wear-leveled storage
//! engine that persists it, independent of the EEPROM part in use:
//!
//! - Record layout and marker recognition
//! - Settings defaults and field access
//! - Diff-based byte writer
//! - Single-byte-stride region scanner
//! - Storage manager (cursor, dirty flag, write budget)
//! - Mutex-guarded shared storage for multi-task callers

#![no_std]
#![deny(unsafe_code)]

pub mod record;
pub mod settings;
pub mod storage;

pub use record::Record;
pub use settings::{Settings, SettingsField};
pub use storage::{
    ConfigError, CursorAdvance, SaveOutcome, SharedStorage, StorageConfig, StorageError,
    StorageManager, WriteReport,
};
