//! Storage error types

/// Errors from load and save
///
/// All of these are recoverable: the active record stays in memory and the
/// dirty flag is kept on any save failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No block with a valid marker in the region
    LoadNotFound,
    /// Written + skipped bytes did not add up to the record size
    WriteIncomplete {
        /// Device address of the block
        address: usize,
        /// Bytes physically written before the pass stopped
        written: usize,
        /// Bytes already holding the desired value
        skipped: usize,
        /// Record size
        expected: usize,
    },
    /// The session write budget would be exceeded; nothing was written
    WriteBudgetExceeded {
        /// Writes already spent this session
        used: u32,
        /// Writes this save needs
        required: u32,
        /// Session limit
        limit: u32,
    },
}

/// Errors from validating a [`StorageConfig`](super::StorageConfig)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Region cannot hold a single record
    RegionTooSmall {
        /// Configured region size
        region_size: usize,
        /// Record size
        record_size: usize,
    },
    /// Region extends past the end of the device
    RegionOutOfBounds {
        /// One past the last region address
        region_end: usize,
        /// Device capacity
        capacity: usize,
    },
    /// Record type has an empty or oversized marker
    InvalidMarker,
}
