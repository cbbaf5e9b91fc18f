//! Inter-task communication channels
//!
//! Defines the static channels used to hand settings changes to the
//! persistence task, which is their only consumer. Producers (a front
//! panel, a serial console) live in board-specific tasks and are not part
//! of this binary.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use terrarium_core::SettingsField;

/// Channel capacity for settings edits
const EDIT_CHANNEL_SIZE: usize = 8;

/// Settings edits (field, new value)
///
/// Hook point for input tasks: send here instead of touching the storage.
pub static SETTINGS_EDIT: Channel<CriticalSectionRawMutex, (SettingsField, u8), EDIT_CHANNEL_SIZE> =
    Channel::new();

/// Request an immediate save instead of waiting for the next interval
///
/// Hook point for input tasks, e.g. after the last edit of a menu session.
pub static SAVE_NOW: Signal<CriticalSectionRawMutex, ()> = Signal::new();
