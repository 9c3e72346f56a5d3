//! tm-driver - Migration driver for Tidemark
//!
//! Ties the pieces together: a process-local [`MigrationLock`], the
//! [`VersionStore`] over the migrations table, the [`MigrationExecutor`] that
//! runs scripts statement by statement, and the [`Driver`] facade an
//! orchestrator opens through a [`Registry`].

pub mod driver;
pub mod error;
pub mod executor;
pub mod lock;
pub mod registry;
pub mod store;

#[cfg(test)]
mod testing;

pub use driver::Driver;
pub use error::{MigrateError, MigrateResult};
pub use executor::{ExecutionSummary, MigrationExecutor};
pub use lock::MigrationLock;
pub use registry::{DriverFactory, DuckDbFactory, Registry};
pub use store::VersionStore;
