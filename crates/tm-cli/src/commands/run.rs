//! Run command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{close_driver, open_driver, open_script};

/// Execute the run command
///
/// The script is executed as a migration would be, but the version table is
/// left untouched.
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let script = open_script(&args.file)?;
    let driver = open_driver(global).await?;

    let summary = driver
        .run(script)
        .await
        .with_context(|| format!("Script {} failed", args.file))?;
    println!("Executed {} statements from {}", summary.total(), args.file);

    close_driver(driver).await
}
