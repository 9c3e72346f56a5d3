//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tm_core::{DriverConfig, VersionState};
use tm_driver::{Driver, Registry};

use crate::cli::GlobalArgs;

/// Load the driver config named by `--config`, or the defaults.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<DriverConfig> {
    match &global.config {
        Some(path) => DriverConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config: {path}")),
        None => Ok(DriverConfig::default()),
    }
}

/// Open a driver for `--database`, layering its options over the config file.
pub(crate) async fn open_driver(global: &GlobalArgs) -> Result<Driver> {
    let dsn = global
        .database
        .as_deref()
        .context("No database given; pass --database or set TIDEMARK_DATABASE")?;
    let config = load_config(global)?;

    let driver = Registry::with_defaults()
        .open_with(dsn, config)
        .await
        .context("Failed to open migration driver")?;

    let config = driver.config();
    log::debug!(
        "Migrations table: {}, multi-statement: {} (max {} bytes)",
        config.migrations_table,
        config.multi_statement,
        config.multi_statement_max_size
    );
    Ok(driver)
}

/// Open a script file for buffered reading.
pub(crate) fn open_script(path: &str) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open script: {path}"))?;
    Ok(BufReader::new(file))
}

/// Refuse to continue past a failed migration.
pub(crate) fn ensure_clean(state: VersionState) -> Result<()> {
    if state.dirty {
        anyhow::bail!(
            "Database is dirty at version {}; fix it by hand, then run `tidemark force {}`",
            state.version,
            state.version
        );
    }
    Ok(())
}

/// Close the driver, reporting failures as command errors.
pub(crate) async fn close_driver(driver: Driver) -> Result<()> {
    driver
        .close()
        .await
        .context("Failed to close database connection")
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
