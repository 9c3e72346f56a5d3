//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: No driver configuration was supplied at all
    #[error("[C001] No driver configuration supplied")]
    MissingConfig,

    /// C002: Config file not found
    #[error("[C002] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C003: Failed to parse configuration file
    #[error("[C003] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C004: Invalid configuration value
    #[error("[C004] Invalid value '{value}' for '{key}': {message}")]
    ConfigInvalid {
        key: String,
        value: String,
        message: String,
    },

    /// C005: Malformed connection string
    #[error("[C005] Invalid connection string: {message}")]
    InvalidDsn { message: String },

    /// C006: A single statement grew past the multi-statement buffer cap
    #[error("[C006] Statement exceeds multi-statement max size of {max_size} bytes")]
    StatementTooLarge { max_size: usize },

    /// C007: The migration script stream could not be read
    #[error("[C007] Failed to read migration script")]
    ScriptRead(#[source] std::io::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
