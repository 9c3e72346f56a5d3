//! Drop command implementation

use anyhow::{Context, Result};

use crate::cli::{DropArgs, GlobalArgs};
use crate::commands::common::{close_driver, open_driver};

/// Execute the drop command
pub async fn execute(args: &DropArgs, global: &GlobalArgs) -> Result<()> {
    if !args.yes {
        anyhow::bail!("Refusing to drop every table without --yes");
    }

    let driver = open_driver(global).await?;

    driver.lock()?;
    let dropped = driver.drop_all().await;
    driver.unlock()?;

    let dropped = dropped.context("Failed to drop database objects")?;
    println!(
        "Dropped {} object{}",
        dropped,
        if dropped == 1 { "" } else { "s" }
    );

    close_driver(driver).await
}
