//! Process-local migration lock
//!
//! A single compare-and-swap flag per driver instance. It never blocks,
//! queues or times out, and it gives no protection against a second process
//! migrating the same database: runs from separate processes must be
//! serialized outside the driver.

use crate::error::{MigrateError, MigrateResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// Advisory lock with `Unlocked -> Locked -> Unlocked` transitions only.
#[derive(Debug, Default)]
pub struct MigrationLock {
    locked: AtomicBool,
}

impl MigrationLock {
    /// A new, unlocked lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock, failing with [`MigrateError::Locked`] if it is held.
    pub fn acquire(&self) -> MigrateResult<()> {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| MigrateError::Locked)
    }

    /// Give the lock back, failing with [`MigrateError::NotLocked`] if it is free.
    pub fn release(&self) -> MigrateResult<()> {
        self.locked
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| MigrateError::NotLocked)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}
