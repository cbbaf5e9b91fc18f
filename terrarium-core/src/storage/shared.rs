//! Shared storage for multi-task callers
//!
//! Interleaved diff writes to overlapping addresses corrupt the stored
//! block, so every operation runs inside one blocking mutex.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use terrarium_hal::ByteStorage;

use super::error::StorageError;
use super::manager::{SaveOutcome, StorageManager};
use crate::record::Record;

/// [`StorageManager`] behind a blocking mutex
///
/// `M` picks the mutex flavour: `CriticalSectionRawMutex` when tasks on
/// different executors or interrupts share it, `NoopRawMutex` when all
/// callers live on one executor.
pub struct SharedStorage<M: RawMutex, S, R> {
    inner: Mutex<M, RefCell<StorageManager<S, R>>>,
}

impl<M, S, R> SharedStorage<M, S, R>
where
    M: RawMutex,
    S: ByteStorage,
    R: Record,
{
    /// Wrap a manager
    pub fn new(manager: StorageManager<S, R>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(manager)),
        }
    }

    /// Run `f` with exclusive access to the manager
    ///
    /// `f` must not call back into this `SharedStorage`; the nested borrow
    /// panics.
    pub fn with<T>(&self, f: impl FnOnce(&mut StorageManager<S, R>) -> T) -> T {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// See [`StorageManager::load`]
    pub fn load(&self) -> Result<usize, StorageError> {
        self.with(|mgr| mgr.load())
    }

    /// See [`StorageManager::save`]
    pub fn save(&self) -> Result<SaveOutcome, StorageError> {
        self.with(|mgr| mgr.save())
    }

    /// See [`StorageManager::edit`]
    pub fn edit(&self, f: impl FnOnce(&mut R)) -> bool {
        self.with(|mgr| mgr.edit(f))
    }

    /// Copy of the active record
    pub fn snapshot(&self) -> R
    where
        R: Clone,
    {
        self.with(|mgr| mgr.record().clone())
    }

    /// Check for unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.with(|mgr| mgr.is_dirty())
    }

    /// Unwrap the manager
    pub fn into_inner(self) -> StorageManager<S, R> {
        self.inner.into_inner().into_inner()
    }
}
