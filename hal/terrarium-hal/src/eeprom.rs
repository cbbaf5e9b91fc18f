//! EEPROM storage abstractions
//!
//! Provides the single-byte primitives that chip-specific drivers expose
//! for byte-addressable non-volatile memory.

/// Errors from EEPROM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    /// Address is past the end of the device
    OutOfBounds,
    /// Bus transfer failed (NACK, arbitration lost, ...)
    Bus,
    /// Device did not finish its internal write cycle in time
    Timeout,
    /// Device refused or failed the write
    WriteFault,
}

/// Byte-addressable non-volatile memory
///
/// Every successful [`write_byte`](ByteStorage::write_byte) costs one
/// physical write cycle of the addressed cell. Callers that care about
/// endurance should read first and only write bytes that change.
pub trait ByteStorage {
    /// Total number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read one byte
    ///
    /// # Arguments
    /// * `address` - Byte address, `0..capacity()`
    fn read_byte(&mut self, address: usize) -> Result<u8, EepromError>;

    /// Write one byte
    ///
    /// # Arguments
    /// * `address` - Byte address, `0..capacity()`
    /// * `value` - Value to store
    fn write_byte(&mut self, address: usize, value: u8) -> Result<(), EepromError>;
}

impl<T: ByteStorage + ?Sized> ByteStorage for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read_byte(&mut self, address: usize) -> Result<u8, EepromError> {
        (**self).read_byte(address)
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<(), EepromError> {
        (**self).write_byte(address, value)
    }
}
