//! AT24Cxx serial EEPROM (I2C)
//!
//! Microchip/Atmel AT24C family and compatible parts (24LC, M24C, CAT24).
//!
//! # Addressing
//!
//! - AT24C02..AT24C16: one word-address byte. Parts larger than 256 bytes
//!   take the upper address bits (A8..A10) in the low bits of the device
//!   address, so each 256-byte block answers at its own I2C address.
//! - AT24C32..AT24C256: two word-address bytes, big-endian.
//!
//! # Write cycle
//!
//! After a byte write the part runs an internal write cycle (typically
//! 5 ms) during which it does not acknowledge its address. The driver
//! polls for the acknowledge before returning.

use embedded_hal::i2c::I2c;
use terrarium_hal::{ByteStorage, EepromError};

/// Default 7-bit device address (A0..A2 tied low)
pub const DEFAULT_ADDRESS: u8 = 0x50;

/// Default number of acknowledge polls before giving up on a write cycle
///
/// At 400 kHz one poll takes roughly 70 µs, so this covers well over the
/// 5 ms worst-case write time.
pub const DEFAULT_POLL_LIMIT: u32 = 1000;

/// Word-address format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// One byte, block bits in the device address
    OneByte,
    /// Two bytes, big-endian
    TwoBytes,
}

/// Supported parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum At24Variant {
    /// 256 bytes
    At24c02,
    /// 512 bytes
    At24c04,
    /// 1 KiB
    At24c08,
    /// 2 KiB
    At24c16,
    /// 4 KiB
    At24c32,
    /// 8 KiB
    At24c64,
    /// 16 KiB
    At24c128,
    /// 32 KiB
    At24c256,
}

impl At24Variant {
    /// Capacity in bytes
    pub const fn capacity(self) -> usize {
        match self {
            At24Variant::At24c02 => 256,
            At24Variant::At24c04 => 512,
            At24Variant::At24c08 => 1024,
            At24Variant::At24c16 => 2048,
            At24Variant::At24c32 => 4 * 1024,
            At24Variant::At24c64 => 8 * 1024,
            At24Variant::At24c128 => 16 * 1024,
            At24Variant::At24c256 => 32 * 1024,
        }
    }

    /// Word-address format
    pub const fn address_mode(self) -> AddressMode {
        match self {
            At24Variant::At24c02
            | At24Variant::At24c04
            | At24Variant::At24c08
            | At24Variant::At24c16 => AddressMode::OneByte,
            _ => AddressMode::TwoBytes,
        }
    }
}

/// AT24Cxx EEPROM on an I2C bus
pub struct At24<I2C> {
    i2c: I2C,
    /// Base 7-bit device address
    address: u8,
    variant: At24Variant,
    poll_limit: u32,
}

impl<I2C: I2c> At24<I2C> {
    /// Create a driver for `variant` at the 7-bit `address`
    pub fn new(i2c: I2C, address: u8, variant: At24Variant) -> Self {
        Self {
            i2c,
            address,
            variant,
            poll_limit: DEFAULT_POLL_LIMIT,
        }
    }

    /// Set the number of acknowledge polls allowed per write
    pub fn with_poll_limit(mut self, limit: u32) -> Self {
        self.poll_limit = limit.max(1);
        self
    }

    /// Part in use
    pub fn variant(&self) -> At24Variant {
        self.variant
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Resolve a byte address to (device address, word address bytes, length)
    fn locate(&self, address: usize) -> Result<(u8, [u8; 2], usize), EepromError> {
        if address >= self.variant.capacity() {
            return Err(EepromError::OutOfBounds);
        }

        match self.variant.address_mode() {
            AddressMode::OneByte => {
                let block = ((address >> 8) & 0x07) as u8;
                Ok((self.address | block, [address as u8, 0], 1))
            }
            AddressMode::TwoBytes => Ok((self.address, [(address >> 8) as u8, address as u8], 2)),
        }
    }

    /// Poll until the device acknowledges again after a write
    fn wait_ready(&mut self, device: u8, word: &[u8]) -> Result<(), EepromError> {
        for _ in 0..self.poll_limit {
            // Setting the address pointer is harmless and NACKs while busy
            if self.i2c.write(device, word).is_ok() {
                return Ok(());
            }
        }
        Err(EepromError::Timeout)
    }
}

impl<I2C: I2c> ByteStorage for At24<I2C> {
    fn capacity(&self) -> usize {
        self.variant.capacity()
    }

    fn read_byte(&mut self, address: usize) -> Result<u8, EepromError> {
        let (device, word, len) = self.locate(address)?;
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(device, &word[..len], &mut buf)
            .map_err(|_| EepromError::Bus)?;
        Ok(buf[0])
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<(), EepromError> {
        let (device, word, len) = self.locate(address)?;

        let mut frame = [0u8; 3];
        frame[..len].copy_from_slice(&word[..len]);
        frame[len] = value;

        self.i2c
            .write(device, &frame[..len + 1])
            .map_err(|_| EepromError::Bus)?;

        self.wait_ready(device, &word[..len])
    }
}
