//! Terrarium - Climate Controller Firmware
//!
//! Main firmware binary for RP2040-based terrarium controllers.
//! Loads the controller settings from an external I2C EEPROM at boot
//! and persists changes through a wear-leveled storage manager.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use terrarium_core::storage::{CursorAdvance, StorageConfig, StorageError};
use terrarium_core::{Settings, SharedStorage, StorageManager};
use terrarium_drivers::eeprom::at24::DEFAULT_ADDRESS;
use terrarium_drivers::eeprom::{At24, At24Variant};

use crate::tasks::Storage;

mod channels;
mod tasks;

/// EEPROM fitted on the board
const EEPROM_VARIANT: At24Variant = At24Variant::At24c32;

/// I2C clock (Fast mode)
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Physical byte writes allowed per boot
const MAX_WRITES_PER_BOOT: u32 = 1024;

/// Settings region: the whole EEPROM
const STORAGE_CONFIG: StorageConfig = StorageConfig::new(EEPROM_VARIANT.capacity())
    .with_cursor_advance(CursorAdvance::OnDirtySave)
    .with_max_write_cycles(MAX_WRITES_PER_BOOT);

// Settings storage must live forever for task references
static STORAGE: StaticCell<Storage> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Terrarium firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // EEPROM on I2C0 (SDA=GPIO4, SCL=GPIO5)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let bus = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let eeprom = At24::new(bus, DEFAULT_ADDRESS, EEPROM_VARIANT);
    info!(
        "EEPROM: {:?}, {} bytes",
        EEPROM_VARIANT,
        EEPROM_VARIANT.capacity()
    );

    let manager = unwrap!(StorageManager::new(
        eeprom,
        Settings::default(),
        STORAGE_CONFIG
    ));
    let storage: &'static Storage = STORAGE.init(SharedStorage::new(manager));

    load_settings(storage);

    spawner.spawn(tasks::persist_task(storage)).unwrap();

    info!("All tasks spawned");
}

/// Load settings from EEPROM, falling back to compiled-in defaults
fn load_settings(storage: &Storage) {
    match storage.load() {
        Ok(offset) => {
            info!("Settings loaded from EEPROM offset {}", offset);
            debug!("{:?}", storage.snapshot());
        }
        Err(StorageError::LoadNotFound) => {
            warn!("No stored settings found, using defaults");
        }
        Err(e) => {
            warn!("Failed to load settings: {:?}, using defaults", e);
        }
    }
}
