//! Force command implementation

use anyhow::{Context, Result};
use tm_core::VersionState;

use crate::cli::{ForceArgs, GlobalArgs};
use crate::commands::common::{close_driver, open_driver};

/// Execute the force command
pub async fn execute(args: &ForceArgs, global: &GlobalArgs) -> Result<()> {
    let driver = open_driver(global).await?;

    driver
        .set_version(args.version, false)
        .await
        .with_context(|| format!("Failed to record version {}", args.version))?;
    println!("Version: {}", VersionState::new(args.version, false));

    close_driver(driver).await
}
