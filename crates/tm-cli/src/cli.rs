//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Tidemark - versioned SQL migrations with a durable version record
#[derive(Parser, Debug)]
#[command(name = "tidemark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database connection string, e.g. duckdb:///var/lib/app.duckdb?x-multi-statement=true
    #[arg(short, long, global = true, env = "TIDEMARK_DATABASE")]
    pub database: Option<String>,

    /// Driver config file (YAML); connection-string options take precedence
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current version and dirty flag
    Version(VersionArgs),

    /// Run one migration script and record its version
    Apply(ApplyArgs),

    /// Execute a script without recording a version
    Run(RunArgs),

    /// Record a version as clean without running anything
    Force(ForceArgs),

    /// Drop every object in the database, the migrations table included
    Drop(DropArgs),
}

/// Arguments for the version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: VersionOutput,
}

/// Version output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOutput {
    /// Human-readable line
    Text,
    /// JSON object with version and dirty
    Json,
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Version the script migrates to
    pub version: i64,

    /// Path to the migration script
    pub file: String,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the script
    pub file: String,
}

/// Arguments for the force command
#[derive(Args, Debug)]
pub struct ForceArgs {
    /// Version to record; -1 resets to "no version"
    #[arg(allow_negative_numbers = true)]
    pub version: i64,
}

/// Arguments for the drop command
#[derive(Args, Debug)]
pub struct DropArgs {
    /// Confirm dropping everything
    #[arg(long)]
    pub yes: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
