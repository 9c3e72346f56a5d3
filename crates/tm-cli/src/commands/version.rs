//! Version command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, VersionArgs, VersionOutput};
use crate::commands::common::{close_driver, open_driver};

/// Execute the version command
pub async fn execute(args: &VersionArgs, global: &GlobalArgs) -> Result<()> {
    let driver = open_driver(global).await?;
    let state = driver
        .version()
        .await
        .context("Failed to read current version")?;

    match args.output {
        VersionOutput::Text => println!("Version: {state}"),
        VersionOutput::Json => println!("{}", serde_json::to_string_pretty(&state)?),
    }

    close_driver(driver).await
}
