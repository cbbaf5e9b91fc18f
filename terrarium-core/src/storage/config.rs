//! Storage configuration
//!
//! Where the settings region lives and how saves move through it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default region size (ATmega328 on-chip EEPROM)
pub const DEFAULT_REGION_SIZE: usize = 1024;

/// Write budget the controller firmware applies per boot
pub const DEFAULT_MAX_WRITE_CYCLES: u32 = 50;

/// When the write cursor moves
///
/// The policy decides how writes spread over the region, so pick one per
/// product and keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CursorAdvance {
    /// Advance on every save call, even when nothing is written
    ///
    /// Clean saves stop advancing once the next write would no longer
    /// overlap the marker of the newest stored copy.
    EverySave,
    /// Advance only when the record is dirty
    #[default]
    OnDirtySave,
    /// Never advance; the record is rewritten in place
    Never,
}

/// Storage region and policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StorageConfig {
    /// First device address of the region
    pub region_start: usize,
    /// Region length in bytes (must hold at least one record)
    pub region_size: usize,
    /// Maximum physical byte writes per session (None = unlimited)
    pub max_write_cycles: Option<u32>,
    /// Cursor movement policy
    pub cursor_advance: CursorAdvance,
    /// Continue the sweep from the loaded record instead of offset 0
    pub resume_after_load: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl StorageConfig {
    /// Whole 1 KiB device, advance on dirty saves, no write budget
    pub const DEFAULT: Self = Self {
        region_start: 0,
        region_size: DEFAULT_REGION_SIZE,
        max_write_cycles: None,
        cursor_advance: CursorAdvance::OnDirtySave,
        resume_after_load: false,
    };

    /// Configuration covering `region_size` bytes from address 0
    pub const fn new(region_size: usize) -> Self {
        Self {
            region_size,
            ..Self::DEFAULT
        }
    }

    /// Place the region at `start`
    pub const fn with_region_start(mut self, start: usize) -> Self {
        self.region_start = start;
        self
    }

    /// Cap physical writes per session
    pub const fn with_max_write_cycles(mut self, limit: u32) -> Self {
        self.max_write_cycles = Some(limit);
        self
    }

    /// Select the cursor policy
    pub const fn with_cursor_advance(mut self, policy: CursorAdvance) -> Self {
        self.cursor_advance = policy;
        self
    }

    /// Resume the cursor at the loaded record's offset
    pub const fn with_resume_after_load(mut self, resume: bool) -> Self {
        self.resume_after_load = resume;
        self
    }

    /// One past the last device address of the region
    pub const fn region_end(&self) -> usize {
        self.region_start + self.region_size
    }

    /// Highest cursor at which a `record_size`-byte block still fits
    pub const fn last_offset(&self, record_size: usize) -> usize {
        self.region_size.saturating_sub(record_size)
    }
}
