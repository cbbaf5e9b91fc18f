//! Diff-based block writer
//!
//! Each destination byte is read first and only written when it differs
//! from the desired value. Unchanged bytes cost no write cycle.

use terrarium_hal::{ByteStorage, EepromError};

/// Result of a block write (or a dry run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteReport {
    /// Bytes that differed and were written
    pub written: usize,
    /// Bytes that already held the desired value
    pub skipped: usize,
    /// Device fault that stopped the pass, if any
    pub fault: Option<EepromError>,
}

impl WriteReport {
    /// Bytes processed before the pass ended
    pub fn total(&self) -> usize {
        self.written + self.skipped
    }

    /// Check that every byte of an `expected`-byte block was handled
    pub fn is_complete(&self, expected: usize) -> bool {
        self.total() == expected
    }
}

/// Write `data` at `address`, skipping bytes that already match
///
/// Stops at the first device fault; the report then covers only the bytes
/// handled so far, so `written + skipped` falls short of `data.len()`.
pub fn update_block<S: ByteStorage>(storage: &mut S, address: usize, data: &[u8]) -> WriteReport {
    let mut report = WriteReport::default();

    for (i, &desired) in data.iter().enumerate() {
        let current = match storage.read_byte(address + i) {
            Ok(value) => value,
            Err(e) => {
                report.fault = Some(e);
                break;
            }
        };

        if current == desired {
            report.skipped += 1;
            continue;
        }

        if let Err(e) = storage.write_byte(address + i, desired) {
            report.fault = Some(e);
            break;
        }
        report.written += 1;
    }

    report
}

/// Dry run of [`update_block`]: count the bytes that would be written
///
/// Only reads the device.
pub fn diff_block<S: ByteStorage>(storage: &mut S, address: usize, data: &[u8]) -> WriteReport {
    let mut report = WriteReport::default();

    for (i, &desired) in data.iter().enumerate() {
        match storage.read_byte(address + i) {
            Ok(current) if current == desired => report.skipped += 1,
            Ok(_) => report.written += 1,
            Err(e) => {
                report.fault = Some(e);
                break;
            }
        }
    }

    report
}
