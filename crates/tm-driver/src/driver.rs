//! The migration driver
//!
//! A [`Driver`] owns one database connection and exposes the operations a
//! migration orchestrator drives: lock, run a script, read and record the
//! version, drop everything, close. It applies one script at a time and never
//! decides which version comes next.

use crate::error::{MigrateError, MigrateResult};
use crate::executor::{ExecutionSummary, MigrationExecutor};
use crate::lock::MigrationLock;
use crate::registry::Registry;
use crate::store::VersionStore;
use std::io::Read;
use tm_core::{CoreError, DriverConfig, VersionState};
use tm_db::Database;

/// Migration driver over a single database connection.
///
/// Not meant for concurrent use: callers serialize `run`, `set_version` and
/// friends on one instance.
pub struct Driver {
    db: Box<dyn Database>,
    config: DriverConfig,
    store: VersionStore,
    lock: MigrationLock,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("db", &self.db.db_type())
            .field("config", &self.config)
            .field("locked", &self.lock.is_locked())
            .finish()
    }
}

impl Driver {
    /// Open a driver from a connection string using the built-in backends.
    pub async fn open(dsn: &str) -> MigrateResult<Self> {
        Registry::with_defaults().open(dsn).await
    }

    /// Wrap an already-open database.
    ///
    /// A missing config is rejected before the database is touched. The
    /// database is then pinged, the config normalized, and the migrations
    /// table created if it does not exist yet.
    pub async fn with_instance(
        db: Box<dyn Database>,
        config: Option<DriverConfig>,
    ) -> MigrateResult<Self> {
        let config = config.ok_or(CoreError::MissingConfig)?.normalized();

        db.ping().await.map_err(MigrateError::Connection)?;

        let driver = Self {
            store: VersionStore::new(config.migrations_table.clone()),
            db,
            config,
            lock: MigrationLock::new(),
        };
        driver.ensure_version_table().await?;

        log::debug!(
            "Opened {} migration driver (table: {}, multi-statement: {})",
            driver.db.db_type(),
            driver.config.migrations_table,
            driver.config.multi_statement
        );
        Ok(driver)
    }

    /// Check-then-create of the migrations table, holding the lock.
    async fn ensure_version_table(&self) -> MigrateResult<()> {
        self.lock.acquire()?;
        let created = self.store.ensure_table(self.db.as_ref()).await;
        let released = self.lock.release();

        match (created, released) {
            (Ok(_), Ok(())) => Ok(()),
            (Err(err), Ok(())) | (Ok(_), Err(err)) => Err(err),
            (Err(err), Err(unlock)) => Err(err.combine(unlock)),
        }
    }

    /// The normalized configuration in effect.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn database(&self) -> &dyn Database {
        self.db.as_ref()
    }

    /// Take the process-local lock. Fails immediately if it is held.
    pub fn lock(&self) -> MigrateResult<()> {
        self.lock.acquire()
    }

    /// Release the process-local lock. Fails if it is not held.
    pub fn unlock(&self) -> MigrateResult<()> {
        self.lock.release()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Execute a migration script without touching the version table.
    pub async fn run<R: Read + Send>(&self, script: R) -> MigrateResult<ExecutionSummary> {
        MigrationExecutor::new(self.db.as_ref(), &self.config)
            .execute(script)
            .await
    }

    /// Current version and dirty flag.
    pub async fn version(&self) -> MigrateResult<VersionState> {
        self.store.read_current(self.db.as_ref()).await
    }

    /// Record `(version, dirty)` as the current state.
    pub async fn set_version(&self, version: i64, dirty: bool) -> MigrateResult<()> {
        self.store
            .append_record(self.db.as_ref(), version, dirty)
            .await
            .map(|_| ())
    }

    /// Run one migration script and record its outcome.
    ///
    /// Success records `(version, false)`. Failure records `(version, true)`
    /// and returns the script's error, combined with the recording error if
    /// marking the version dirty failed as well.
    pub async fn apply<R: Read + Send>(
        &self,
        version: i64,
        script: R,
    ) -> MigrateResult<ExecutionSummary> {
        match self.run(script).await {
            Ok(summary) => {
                self.set_version(version, false).await?;
                log::info!(
                    "Applied version {version} ({} statements)",
                    summary.total()
                );
                Ok(summary)
            }
            Err(err) => {
                log::warn!("Migration to version {version} failed, marking it dirty: {err}");
                match self.set_version(version, true).await {
                    Ok(()) => Err(err),
                    Err(record_err) => Err(err.combine(record_err)),
                }
            }
        }
    }

    /// Drop every object in the target (tables, views, macros, sequences,
    /// types and schemas), the migrations table included.
    ///
    /// Returns the number of objects dropped. The migrations table is gone
    /// afterwards; reopen the driver to recreate it.
    pub async fn drop_all(&self) -> MigrateResult<usize> {
        let dropped = self.store.drop_all(self.db.as_ref()).await?;
        log::info!("Dropped {dropped} objects");
        Ok(dropped)
    }

    /// Close the underlying connection.
    pub async fn close(self) -> MigrateResult<()> {
        self.db.close().await.map_err(MigrateError::Close)
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
