//! Storage manager
//!
//! Owns the active record, the write cursor and the dirty flag. `load`
//! delegates to the scanner, `save` advances the cursor and delegates to
//! the diff writer.

use terrarium_hal::ByteStorage;

use super::config::{CursorAdvance, StorageConfig};
use super::error::{ConfigError, StorageError};
use super::scanner::find_record;
use super::writer::{diff_block, update_block, WriteReport};
use crate::record::Record;

/// Successful save result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaveOutcome {
    /// Record was clean; the region was not touched
    Clean {
        /// Cursor after this save call
        cursor: usize,
    },
    /// Record was committed
    Written {
        /// Device address of the block
        address: usize,
        /// Per-byte write counts
        report: WriteReport,
    },
}

impl SaveOutcome {
    /// Physical bytes written by this save
    pub fn bytes_written(&self) -> usize {
        match self {
            SaveOutcome::Clean { .. } => 0,
            SaveOutcome::Written { report, .. } => report.written,
        }
    }
}

/// Wear-leveled storage for a single record
///
/// Construct it with the compiled-in defaults, call [`load`](Self::load)
/// once at boot, mutate through [`edit`](Self::edit) or
/// [`record_mut`](Self::record_mut), and call [`save`](Self::save) whenever
/// the changes should be persisted.
#[derive(Debug)]
pub struct StorageManager<S, R> {
    storage: S,
    config: StorageConfig,
    record: R,
    /// Offset (from region start) of the next save attempt
    cursor: usize,
    dirty: bool,
    /// Physical writes spent since the budget was last reset
    writes_used: u32,
    loaded_at: Option<usize>,
    /// Offset of the newest copy known to be in the region
    newest: Option<usize>,
}

impl<S: ByteStorage, R: Record> StorageManager<S, R> {
    /// Create a manager over `storage` holding `defaults`
    ///
    /// Fails if the region cannot hold one record or does not fit the
    /// device.
    pub fn new(storage: S, defaults: R, config: StorageConfig) -> Result<Self, ConfigError> {
        if R::MARKER.is_empty() || R::MARKER.len() > R::SIZE {
            return Err(ConfigError::InvalidMarker);
        }
        if config.region_size < R::SIZE {
            return Err(ConfigError::RegionTooSmall {
                region_size: config.region_size,
                record_size: R::SIZE,
            });
        }
        let capacity = storage.capacity();
        if config.region_end() > capacity {
            return Err(ConfigError::RegionOutOfBounds {
                region_end: config.region_end(),
                capacity,
            });
        }

        Ok(Self {
            storage,
            config,
            record: defaults,
            cursor: 0,
            dirty: false,
            writes_used: 0,
            loaded_at: None,
            newest: None,
        })
    }

    /// Load the first stored record from the region
    ///
    /// Returns the offset it was found at. On `LoadNotFound` the active
    /// record is left unchanged.
    pub fn load(&mut self) -> Result<usize, StorageError> {
        let hit = find_record::<S, R>(
            &mut self.storage,
            self.config.region_start,
            self.config.region_size,
        )
        .ok_or(StorageError::LoadNotFound)?;

        self.record = R::from_bytes(&hit.bytes);
        self.dirty = false;
        self.loaded_at = Some(hit.offset);
        self.newest = Some(hit.offset);
        if self.config.resume_after_load {
            self.cursor = hit.offset;
        }

        Ok(hit.offset)
    }

    /// Commit the active record if it is dirty
    ///
    /// The cursor moves per [`CursorAdvance`] and wraps to 0 when the block
    /// would run past the region end. On failure the dirty flag stays set
    /// so the next save retries at the next position.
    pub fn save(&mut self) -> Result<SaveOutcome, StorageError> {
        let advance = match self.config.cursor_advance {
            CursorAdvance::EverySave => self.dirty || self.may_drift(),
            CursorAdvance::OnDirtySave => self.dirty,
            CursorAdvance::Never => false,
        };
        if advance {
            self.cursor += 1;
        }
        if self.cursor > self.config.last_offset(R::SIZE) {
            self.cursor = 0;
        }

        if !self.dirty {
            return Ok(SaveOutcome::Clean {
                cursor: self.cursor,
            });
        }

        let address = self.config.region_start + self.cursor;
        let bytes = self.record.to_bytes();

        if let Some(limit) = self.config.max_write_cycles {
            self.check_budget(address, bytes.as_ref(), limit)?;
        }

        let report = update_block(&mut self.storage, address, bytes.as_ref());
        self.writes_used = self.writes_used.saturating_add(report.written as u32);

        if !report.is_complete(R::SIZE) {
            return Err(StorageError::WriteIncomplete {
                address,
                written: report.written,
                skipped: report.skipped,
                expected: R::SIZE,
            });
        }

        self.dirty = false;
        self.newest = Some(self.cursor);
        Ok(SaveOutcome::Written { address, report })
    }

    /// Whether a clean save may move the cursor one step
    ///
    /// The next write must start no later than the marker of the newest
    /// copy, so it overwrites that marker and a scan finds the new copy
    /// first.
    fn may_drift(&self) -> bool {
        let next = self.cursor + 1;
        if next > self.config.last_offset(R::SIZE) {
            return true;
        }
        match self.newest {
            Some(newest) => next < newest + R::marker_offset(),
            None => true,
        }
    }

    /// Dry-run the write and refuse it if it would exceed the budget
    fn check_budget(&mut self, address: usize, bytes: &[u8], limit: u32) -> Result<(), StorageError> {
        let plan = diff_block(&mut self.storage, address, bytes);
        if !plan.is_complete(R::SIZE) {
            return Err(StorageError::WriteIncomplete {
                address,
                written: 0,
                skipped: plan.skipped,
                expected: R::SIZE,
            });
        }

        let required = plan.written as u32;
        if self.writes_used.saturating_add(required) > limit {
            return Err(StorageError::WriteBudgetExceeded {
                used: self.writes_used,
                required,
                limit,
            });
        }
        Ok(())
    }

    /// Active record
    pub fn record(&self) -> &R {
        &self.record
    }

    /// Mutable access to the active record; marks it dirty
    pub fn record_mut(&mut self) -> &mut R {
        self.dirty = true;
        &mut self.record
    }

    /// Apply `f` to the active record
    ///
    /// The record is marked dirty only if its stored bytes changed.
    /// Returns whether they did.
    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut R),
    {
        let before = self.record.to_bytes();
        f(&mut self.record);
        let changed = before.as_ref() != self.record.to_bytes().as_ref();
        self.dirty |= changed;
        changed
    }

    /// Flag the active record as having unsaved changes
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check for unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Offset of the last save attempt (or 0 before any save)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Offset the active record was loaded from, if any
    pub fn loaded_at(&self) -> Option<usize> {
        self.loaded_at
    }

    /// Physical writes spent this session
    pub fn writes_used(&self) -> u32 {
        self.writes_used
    }

    /// Start a new write-budget session
    pub fn reset_write_budget(&mut self) {
        self.writes_used = 0;
    }

    /// Active configuration
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Underlying device
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Underlying device, mutably
    ///
    /// Writes made through this bypass the cursor, dirty flag and budget.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the manager and return the device
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Settings, SettingsField, SETTINGS_SIZE};
    use terrarium_hal::{EepromError, RamEeprom};

    type Eeprom = RamEeprom<256>;

    fn manager(config: StorageConfig) -> StorageManager<Eeprom, Settings> {
        StorageManager::new(Eeprom::new(), Settings::default(), config).unwrap()
    }

    /// 22-byte record with the `":)"` marker
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Climate {
        fields: [u8; 20],
    }

    impl Record for Climate {
        type Bytes = [u8; 22];
        const MARKER: &'static [u8] = b":)";

        fn to_bytes(&self) -> [u8; 22] {
            let mut bytes = [0u8; 22];
            bytes[..20].copy_from_slice(&self.fields);
            bytes[20..].copy_from_slice(b":)");
            bytes
        }

        fn from_bytes(bytes: &[u8; 22]) -> Self {
            let mut fields = [0u8; 20];
            fields.copy_from_slice(&bytes[..20]);
            Self { fields }
        }
    }

    #[test]
    fn test_rejects_small_region() {
        let result = StorageManager::new(
            Eeprom::new(),
            Settings::default(),
            StorageConfig::new(SETTINGS_SIZE - 1),
        );
        assert!(matches!(result, Err(ConfigError::RegionTooSmall { .. })));
    }

    #[test]
    fn test_rejects_region_past_device() {
        let result = StorageManager::new(
            Eeprom::new(),
            Settings::default(),
            StorageConfig::new(200).with_region_start(100),
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::RegionOutOfBounds {
                region_end: 300,
                capacity: 256
            })
        );
    }

    #[test]
    fn test_load_miss_leaves_defaults() {
        let mut mgr = manager(StorageConfig::new(256));
        mgr.record_mut().humid_threshold = 77;

        assert_eq!(mgr.load(), Err(StorageError::LoadNotFound));
        assert_eq!(mgr.record().humid_threshold, 77);
        assert!(mgr.is_dirty());
        assert_eq!(mgr.loaded_at(), None);
    }

    #[test]
    fn test_clean_save_is_noop() {
        let mut mgr = manager(StorageConfig::new(256));

        let outcome = mgr.save().unwrap();
        assert_eq!(outcome, SaveOutcome::Clean { cursor: 0 });
        assert_eq!(mgr.storage().total_writes(), 0);
    }

    #[test]
    fn test_every_save_policy_advances_when_clean() {
        let config = StorageConfig::new(256).with_cursor_advance(CursorAdvance::EverySave);
        let mut mgr = manager(config);

        let outcome = mgr.save().unwrap();
        assert_eq!(outcome, SaveOutcome::Clean { cursor: 1 });
        assert_eq!(mgr.storage().total_writes(), 0);
    }

    /// Dirty save, a run of clean saves, then another dirty save
    fn save_after_idle_run(policy: CursorAdvance) -> (usize, StorageManager<RamEeprom<128>, Settings>) {
        let config = StorageConfig::new(128).with_cursor_advance(policy);
        let mut mgr = StorageManager::new(RamEeprom::<128>::new(), Settings::default(), config).unwrap();

        mgr.edit(|s| s.humid_threshold = 50);
        mgr.save().unwrap();
        for _ in 0..20 {
            assert!(matches!(mgr.save().unwrap(), SaveOutcome::Clean { .. }));
        }
        mgr.edit(|s| s.humid_threshold = 60);
        let address = match mgr.save().unwrap() {
            SaveOutcome::Written { address, .. } => address,
            other => panic!("unexpected outcome {:?}", other),
        };

        let mut fresh = StorageManager::new(mgr.into_storage(), Settings::default(), config).unwrap();
        assert_eq!(fresh.load(), Ok(address));
        (address, fresh)
    }

    #[test]
    fn test_idle_saves_keep_newest_copy_first() {
        let (address, fresh) = save_after_idle_run(CursorAdvance::OnDirtySave);
        assert_eq!(address, 2);
        assert_eq!(fresh.record().humid_threshold, 60);
    }

    #[test]
    fn test_every_save_drift_stops_at_newest_marker() {
        let (address, fresh) = save_after_idle_run(CursorAdvance::EverySave);

        // First copy at 1, its marker at 1 + 15
        assert_eq!(address, 1 + Settings::marker_offset());
        assert_eq!(fresh.record().humid_threshold, 60);
    }

    #[test]
    fn test_every_save_drift_after_load() {
        let mut eeprom = Eeprom::new();
        eeprom.preload(40, &Settings::default().to_bytes());
        let config = StorageConfig::new(256).with_cursor_advance(CursorAdvance::EverySave);
        let mut mgr = StorageManager::new(eeprom, Settings::default(), config).unwrap();
        assert_eq!(mgr.load(), Ok(40));

        for _ in 0..100 {
            mgr.save().unwrap();
        }
        assert_eq!(mgr.cursor(), 40 + Settings::marker_offset() - 1);

        mgr.edit(|s| s.temp_threshold = 25);
        mgr.save().unwrap();
        let mut fresh = StorageManager::new(mgr.into_storage(), Settings::default(), config).unwrap();
        assert_eq!(fresh.load(), Ok(40 + Settings::marker_offset()));
        assert_eq!(fresh.record().temp_threshold, 25);
    }

    #[test]
    fn test_round_trip() {
        let mut mgr = manager(StorageConfig::new(256));
        mgr.edit(|s| {
            s.watering_day_period = 45;
            s.nighttime_to = 5;
        });
        mgr.save().unwrap();
        let expected = mgr.record().to_bytes();

        let eeprom = mgr.into_storage();
        let mut fresh = StorageManager::new(eeprom, Settings::default(), StorageConfig::new(256)).unwrap();
        assert_eq!(fresh.load(), Ok(1));
        assert_eq!(fresh.record().to_bytes(), expected);
        assert!(!fresh.is_dirty());
    }

    #[test]
    fn test_second_save_writes_nothing() {
        let mut mgr = manager(StorageConfig::new(256));
        mgr.mark_dirty();

        let first = mgr.save().unwrap();
        assert_eq!(first.bytes_written(), SETTINGS_SIZE);
        let writes = mgr.storage().total_writes();

        let second = mgr.save().unwrap();
        assert!(matches!(second, SaveOutcome::Clean { .. }));
        assert_eq!(mgr.storage().total_writes(), writes);
    }

    #[test]
    fn test_cursor_sweeps_and_wraps() {
        let mut mgr = manager(StorageConfig::new(256));
        let last = 256 - SETTINGS_SIZE;

        let mut previous = mgr.cursor();
        for _ in 0..last {
            mgr.mark_dirty();
            mgr.save().unwrap();
            assert!(mgr.cursor() > previous);
            previous = mgr.cursor();
        }
        assert_eq!(mgr.cursor(), last);

        mgr.mark_dirty();
        let outcome = mgr.save().unwrap();
        assert_eq!(mgr.cursor(), 0);
        assert!(matches!(outcome, SaveOutcome::Written { address: 0, .. }));
    }

    #[test]
    fn test_written_address_includes_region_start() {
        let mut mgr = manager(StorageConfig::new(128).with_region_start(64));
        mgr.mark_dirty();

        let outcome = mgr.save().unwrap();
        assert!(matches!(outcome, SaveOutcome::Written { address: 65, .. }));
        assert_eq!(mgr.load(), Ok(1));
    }

    #[test]
    fn test_on_dirty_policy_holds_cursor_when_clean() {
        let config = StorageConfig::new(256).with_cursor_advance(CursorAdvance::OnDirtySave);
        let mut mgr = manager(config);

        mgr.save().unwrap();
        mgr.save().unwrap();
        assert_eq!(mgr.cursor(), 0);

        mgr.mark_dirty();
        mgr.save().unwrap();
        assert_eq!(mgr.cursor(), 1);
    }

    #[test]
    fn test_never_policy_rewrites_in_place() {
        let config = StorageConfig::new(256).with_cursor_advance(CursorAdvance::Never);
        let mut mgr = manager(config);
        mgr.mark_dirty();
        mgr.save().unwrap();

        mgr.edit(|s| s.light_threshold = 180);
        let outcome = mgr.save().unwrap();

        assert_eq!(mgr.cursor(), 0);
        match outcome {
            SaveOutcome::Written { address, report } => {
                assert_eq!(address, 0);
                assert_eq!(report.written, 1);
                assert_eq!(report.skipped, SETTINGS_SIZE - 1);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_edit_without_change_stays_clean() {
        let mut mgr = manager(StorageConfig::new(256));
        let changed = mgr.edit(|s| s.set(SettingsField::DaytimeFrom, 13));

        assert!(!changed);
        assert!(!mgr.is_dirty());
    }

    #[test]
    fn test_write_failure_keeps_dirty() {
        let mut mgr = manager(StorageConfig::new(256));
        mgr.mark_dirty();
        mgr.storage_mut().fail_writes_after(4);

        let err = mgr.save().unwrap_err();
        assert_eq!(
            err,
            StorageError::WriteIncomplete {
                address: 1,
                written: 4,
                skipped: 0,
                expected: SETTINGS_SIZE,
            }
        );
        assert!(mgr.is_dirty());

        // Retry lands at the next position
        mgr.storage_mut().clear_faults();
        let outcome = mgr.save().unwrap();
        assert!(matches!(outcome, SaveOutcome::Written { address: 2, .. }));
        assert!(!mgr.is_dirty());
    }

    #[test]
    fn test_write_budget_exceeded() {
        let config = StorageConfig::new(256).with_max_write_cycles(20);
        let mut mgr = manager(config);
        mgr.mark_dirty();
        mgr.save().unwrap();
        assert_eq!(mgr.writes_used(), SETTINGS_SIZE as u32);

        // Shifting the block by one rewrites most of it
        mgr.edit(|s| s.misting_day_period = 31);
        let err = mgr.save().unwrap_err();
        assert!(matches!(
            err,
            StorageError::WriteBudgetExceeded { used, limit: 20, .. } if used == SETTINGS_SIZE as u32
        ));
        assert!(mgr.is_dirty());
        assert_eq!(mgr.storage().total_writes(), SETTINGS_SIZE as u32);

        mgr.reset_write_budget();
        assert!(mgr.save().is_ok());
    }

    #[test]
    fn test_budget_allows_diff_only_writes() {
        let config = StorageConfig::new(256)
            .with_cursor_advance(CursorAdvance::Never)
            .with_max_write_cycles(SETTINGS_SIZE as u32 + 2);
        let mut mgr = manager(config);
        mgr.mark_dirty();
        mgr.save().unwrap();

        mgr.edit(|s| s.temp_threshold = 22);
        mgr.save().unwrap();
        mgr.edit(|s| s.temp_threshold = 24);
        mgr.save().unwrap();
        assert_eq!(mgr.writes_used(), SETTINGS_SIZE as u32 + 2);

        mgr.edit(|s| s.temp_threshold = 26);
        assert!(matches!(
            mgr.save(),
            Err(StorageError::WriteBudgetExceeded { required: 1, .. })
        ));
    }

    #[test]
    fn test_resume_after_load() {
        let mut eeprom = Eeprom::new();
        eeprom.preload(100, &Settings::default().to_bytes());

        let config = StorageConfig::new(256).with_resume_after_load(true);
        let mut mgr = StorageManager::new(eeprom, Settings::default(), config).unwrap();
        assert_eq!(mgr.load(), Ok(100));
        assert_eq!(mgr.cursor(), 100);

        mgr.edit(|s| s.daytime_to = 17);
        let outcome = mgr.save().unwrap();
        assert!(matches!(outcome, SaveOutcome::Written { address: 101, .. }));
    }

    #[test]
    fn test_load_without_resume_keeps_cursor() {
        let mut eeprom = Eeprom::new();
        eeprom.preload(100, &Settings::default().to_bytes());

        let mut mgr = StorageManager::new(eeprom, Settings::default(), StorageConfig::new(256)).unwrap();
        assert_eq!(mgr.load(), Ok(100));
        assert_eq!(mgr.cursor(), 0);
        assert_eq!(mgr.loaded_at(), Some(100));
    }

    #[test]
    fn test_newest_copy_found_after_sweep() {
        let mut mgr = manager(StorageConfig::new(64));
        for value in 0..10u8 {
            mgr.edit(|s| s.light_day_duration = value);
            mgr.save().unwrap();
        }

        let eeprom = mgr.into_storage();
        let mut fresh = StorageManager::new(eeprom, Settings::default(), StorageConfig::new(64)).unwrap();
        let offset = fresh.load().unwrap();
        assert_eq!(offset, 10);
        assert_eq!(fresh.record().light_day_duration, 9);
    }

    #[test]
    fn test_device_read_fault_is_incomplete() {
        struct Broken;

        impl ByteStorage for Broken {
            fn capacity(&self) -> usize {
                64
            }

            fn read_byte(&mut self, _address: usize) -> Result<u8, EepromError> {
                Err(EepromError::Bus)
            }

            fn write_byte(&mut self, _address: usize, _value: u8) -> Result<(), EepromError> {
                Err(EepromError::Bus)
            }
        }

        let mut mgr = StorageManager::new(Broken, Settings::default(), StorageConfig::new(64)).unwrap();
        assert_eq!(mgr.load(), Err(StorageError::LoadNotFound));

        mgr.mark_dirty();
        assert!(matches!(
            mgr.save(),
            Err(StorageError::WriteIncomplete { written: 0, skipped: 0, .. })
        ));
        assert!(mgr.is_dirty());
    }

    #[test]
    fn test_corrupted_field_scenario() {
        let config = StorageConfig::new(256).with_cursor_advance(CursorAdvance::Never);
        let mut mgr =
            StorageManager::new(Eeprom::new(), Climate { fields: [7; 20] }, config).unwrap();
        assert_eq!(<Climate as Record>::SIZE, 22);

        mgr.mark_dirty();
        mgr.save().unwrap();

        // Corrupt a field byte, leave the marker intact
        mgr.storage_mut().poke(3, 0xEE);
        assert_eq!(mgr.load(), Ok(0));
        assert_eq!(mgr.record().fields[3], 0xEE);

        mgr.edit(|r| r.fields[10] = 8);
        match mgr.save().unwrap() {
            SaveOutcome::Written { report, .. } => {
                assert_eq!(report.written, 1);
                assert_eq!(report.skipped, 21);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_first_save_advances_to_one() {
        let mut mgr =
            StorageManager::new(Eeprom::new(), Climate { fields: [1; 20] }, StorageConfig::new(256))
                .unwrap();
        mgr.mark_dirty();

        let outcome = mgr.save().unwrap();
        assert_eq!(mgr.cursor(), 1);
        assert!(matches!(outcome, SaveOutcome::Written { address: 1, .. }));
        assert_eq!(&mgr.storage().contents()[21..23], b":)");
    }
}
