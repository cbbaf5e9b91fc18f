//! Settings persistence task
//!
//! Applies settings edits and commits them to EEPROM. Edits are batched:
//! a save runs on a fixed interval or when `SAVE_NOW` fires, and a clean
//! record costs no write cycles.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Ticker};

use terrarium_core::storage::{SaveOutcome, StorageError};
use terrarium_core::{Settings, SharedStorage};
use terrarium_drivers::eeprom::At24;

use crate::channels::{SAVE_NOW, SETTINGS_EDIT};

/// Interval between periodic saves
pub const SAVE_INTERVAL_S: u64 = 60;

/// Settings storage shared between tasks
pub type Storage =
    SharedStorage<CriticalSectionRawMutex, At24<I2c<'static, I2C0, Blocking>>, Settings>;

/// Persistence task - owns all EEPROM writes after boot
#[embassy_executor::task]
pub async fn persist_task(storage: &'static Storage) {
    info!("Persistence task started");

    let mut ticker = Ticker::every(Duration::from_secs(SAVE_INTERVAL_S));

    loop {
        match select3(SETTINGS_EDIT.receive(), SAVE_NOW.wait(), ticker.next()).await {
            Either3::First((field, value)) => {
                if storage.edit(|s| s.set(field, value)) {
                    debug!("Setting {} = {}", field, value);
                }
            }
            Either3::Second(()) | Either3::Third(()) => save(storage),
        }
    }
}

fn save(storage: &Storage) {
    match storage.save() {
        Ok(SaveOutcome::Clean { .. }) => {}
        Ok(SaveOutcome::Written { address, report }) => {
            info!(
                "Settings saved at address {} ({} written, {} skipped)",
                address, report.written, report.skipped
            );
        }
        Err(StorageError::WriteBudgetExceeded {
            used,
            required,
            limit,
        }) => {
            error!(
                "EEPROM write budget exhausted: {} used + {} needed > {}",
                used, required, limit
            );
        }
        Err(e) => {
            warn!("Failed to save settings: {:?}, will retry", e);
        }
    }
}
