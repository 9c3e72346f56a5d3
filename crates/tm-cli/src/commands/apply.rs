//! Apply command implementation

use anyhow::{Context, Result};

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::{close_driver, ensure_clean, open_driver, open_script};

/// Execute the apply command
pub async fn execute(args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let script = open_script(&args.file)?;
    let driver = open_driver(global).await?;

    let current = driver
        .version()
        .await
        .context("Failed to read current version")?;
    ensure_clean(current)?;

    driver.lock()?;
    let applied = driver.apply(args.version, script).await;
    driver.unlock()?;

    let summary =
        applied.with_context(|| format!("Migration to version {} failed", args.version))?;

    println!(
        "Applied {} -> version {} ({} schema, {} data statements)",
        args.file, args.version, summary.schema_statements, summary.data_statements
    );

    close_driver(driver).await
}
