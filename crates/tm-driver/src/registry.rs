//! Scheme-to-factory registry
//!
//! Callers own the registry and decide which backends it offers; there is no
//! process-wide table.

use crate::driver::Driver;
use crate::error::{MigrateError, MigrateResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tm_core::{ConnectionString, DriverConfig};
use tm_db::DuckDbBackend;

/// Builds a [`Driver`] for one DSN scheme.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Open the target named by `dsn` and initialize a driver on it.
    async fn open(&self, dsn: &ConnectionString) -> MigrateResult<Driver>;
}

/// Factory for `duckdb://` connection strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbFactory;

#[async_trait]
impl DriverFactory for DuckDbFactory {
    async fn open(&self, dsn: &ConnectionString) -> MigrateResult<Driver> {
        let location = dsn.location();
        log::debug!("Opening duckdb database '{location}'");
        let db = DuckDbBackend::new(&location).map_err(MigrateError::Connection)?;
        Driver::with_instance(Box::new(db), Some(dsn.config().clone())).await
    }
}

/// Mapping from DSN scheme to driver factory.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, Box<dyn DriverFactory>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in backend registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("duckdb", DuckDbFactory);
        registry
    }

    /// Register `factory` under `scheme`, replacing any previous one.
    pub fn register(&mut self, scheme: impl Into<String>, factory: impl DriverFactory + 'static) {
        let scheme = scheme.into();
        if self
            .factories
            .insert(scheme.clone(), Box::new(factory))
            .is_some()
        {
            log::debug!("Replaced migration driver factory for scheme '{scheme}'");
        }
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Parse `dsn` and open a driver through the factory for its scheme.
    pub async fn open(&self, dsn: &str) -> MigrateResult<Driver> {
        let dsn = ConnectionString::parse(dsn)?;
        self.open_connection(&dsn).await
    }

    /// Like [`open`](Self::open), with DSN options layered over `base`.
    pub async fn open_with(&self, dsn: &str, base: DriverConfig) -> MigrateResult<Driver> {
        let dsn = ConnectionString::parse_with(dsn, base)?;
        self.open_connection(&dsn).await
    }

    /// Open an already-parsed connection string.
    pub async fn open_connection(&self, dsn: &ConnectionString) -> MigrateResult<Driver> {
        let factory = self
            .factories
            .get(dsn.scheme())
            .ok_or_else(|| MigrateError::UnknownScheme(dsn.scheme().to_string()))?;
        log::debug!("Opening migration driver for {}", dsn.redacted());
        factory.open(dsn).await
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
