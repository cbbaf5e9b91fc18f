//! Wear-leveled record storage
//!
//! Stores one [`Record`](crate::Record) in a region of byte-addressable
//! EEPROM. Two mechanisms limit cell wear:
//!
//! - The write cursor sweeps forward one byte per save and wraps at the end
//!   of the region, spreading writes over every cell.
//! - The byte writer reads before writing and skips bytes that already hold
//!   the desired value.
//!
//! On boot the scanner walks the region one byte at a time looking for the
//! record's marker, since the last save may have landed at any offset.

pub mod config;
pub mod error;
pub mod manager;
pub mod scanner;
pub mod shared;
pub mod writer;

pub use config::{CursorAdvance, StorageConfig};
pub use error::{ConfigError, StorageError};
pub use manager::{SaveOutcome, StorageManager};
pub use scanner::{find_record, ScanHit};
pub use shared::SharedStorage;
pub use writer::{diff_block, update_block, WriteReport};
