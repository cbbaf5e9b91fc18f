//! RAM-backed EEPROM
//!
//! Simulates an EEPROM in memory for host tests and simulation. Supports:
//! - Per-cell write counting for wear-leveling validation
//! - Direct corruption without wear (`poke`)
//! - Write-fault injection for error path testing

use crate::eeprom::{ByteStorage, EepromError};

/// Value of an erased EEPROM cell
pub const ERASED: u8 = 0xFF;

/// In-memory EEPROM of `N` bytes
///
/// # Example
///
/// ```
/// use terrarium_hal::{ByteStorage, RamEeprom};
///
/// let mut eeprom = RamEeprom::<64>::new();
/// eeprom.write_byte(3, 0x2A).unwrap();
///
/// assert_eq!(eeprom.read_byte(3).unwrap(), 0x2A);
/// assert_eq!(eeprom.writes_at(3), 1);
/// assert_eq!(eeprom.total_writes(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RamEeprom<const N: usize> {
    cells: [u8; N],
    wear: [u32; N],
    total_writes: u32,
    total_reads: u32,
    /// Remaining writes before faults are injected (None = never fail)
    writes_until_fault: Option<u32>,
}

impl<const N: usize> Default for RamEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamEeprom<N> {
    /// Create an erased EEPROM (all cells `0xFF`)
    pub const fn new() -> Self {
        Self::filled(ERASED)
    }

    /// Create an EEPROM with every cell set to `value`
    pub const fn filled(value: u8) -> Self {
        Self {
            cells: [value; N],
            wear: [0; N],
            total_writes: 0,
            total_reads: 0,
            writes_until_fault: None,
        }
    }

    /// Raw contents
    pub fn contents(&self) -> &[u8; N] {
        &self.cells
    }

    /// Set a cell directly, without counting a write cycle
    ///
    /// Used to simulate corruption or pre-existing data.
    pub fn poke(&mut self, address: usize, value: u8) {
        self.cells[address] = value;
    }

    /// Copy `data` into the cells starting at `address`, without wear
    pub fn preload(&mut self, address: usize, data: &[u8]) {
        self.cells[address..address + data.len()].copy_from_slice(data);
    }

    /// Number of write cycles a single cell has absorbed
    pub fn writes_at(&self, address: usize) -> u32 {
        self.wear[address]
    }

    /// Highest write count over all cells
    pub fn max_wear(&self) -> u32 {
        self.wear.iter().copied().max().unwrap_or(0)
    }

    /// Total physical writes performed
    pub fn total_writes(&self) -> u32 {
        self.total_writes
    }

    /// Total reads performed
    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    /// Clear the read/write statistics (cell contents are kept)
    pub fn reset_stats(&mut self) {
        self.wear = [0; N];
        self.total_writes = 0;
        self.total_reads = 0;
    }

    /// Let `count` more writes succeed, then fail every write
    pub fn fail_writes_after(&mut self, count: u32) {
        self.writes_until_fault = Some(count);
    }

    /// Stop injecting write faults
    pub fn clear_faults(&mut self) {
        self.writes_until_fault = None;
    }
}

impl<const N: usize> ByteStorage for RamEeprom<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read_byte(&mut self, address: usize) -> Result<u8, EepromError> {
        let value = *self.cells.get(address).ok_or(EepromError::OutOfBounds)?;
        self.total_reads = self.total_reads.saturating_add(1);
        Ok(value)
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<(), EepromError> {
        if address >= N {
            return Err(EepromError::OutOfBounds);
        }

        if let Some(remaining) = self.writes_until_fault.as_mut() {
            if *remaining == 0 {
                return Err(EepromError::WriteFault);
            }
            *remaining -= 1;
        }

        self.cells[address] = value;
        self.wear[address] = self.wear[address].saturating_add(1);
        self.total_writes = self.total_writes.saturating_add(1);
        Ok(())
    }
}
