//! Driver configuration and option parsing

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table that stores version records when none is configured.
pub const DEFAULT_MIGRATIONS_TABLE: &str = "schema_migrations";

/// Multi-statement buffer cap when none (or a non-positive one) is configured: 10 MiB.
pub const DEFAULT_MULTI_STATEMENT_MAX_SIZE: i64 = 10 * (1 << 20);

/// Connection-string options understood by the driver.
///
/// Each option may be spelled with or without the `x-` prefix.
pub const OPTION_MIGRATIONS_TABLE: &str = "migrations-table";
pub const OPTION_MULTI_STATEMENT: &str = "multi-statement";
pub const OPTION_MULTI_STATEMENT_MAX_SIZE: &str = "multi-statement-max-size";

/// Migration driver configuration.
///
/// Immutable once a driver has been initialized with it. Values may come from
/// a YAML file, from connection-string query parameters, or be built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct DriverConfig {
    /// Name of the table holding version records (may be schema-qualified)
    #[serde(default = "default_migrations_table")]
    pub migrations_table: String,

    /// Split scripts on `;` and execute each statement separately
    #[serde(default)]
    pub multi_statement: bool,

    /// Largest statement, in bytes, the splitter will buffer
    #[serde(default = "default_multi_statement_max_size")]
    pub multi_statement_max_size: i64,
}

fn default_migrations_table() -> String {
    DEFAULT_MIGRATIONS_TABLE.to_string()
}

fn default_multi_statement_max_size() -> i64 {
    DEFAULT_MULTI_STATEMENT_MAX_SIZE
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            migrations_table: default_migrations_table(),
            multi_statement: false,
            multi_statement_max_size: DEFAULT_MULTI_STATEMENT_MAX_SIZE,
        }
    }
}

impl DriverConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::ConfigParseError {
            message: format!("{}: {}", path.display(), e),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
            message: e.to_string(),
        })
    }

    /// Replace unusable values with their defaults.
    ///
    /// An empty table name becomes [`DEFAULT_MIGRATIONS_TABLE`] and a
    /// non-positive max size becomes [`DEFAULT_MULTI_STATEMENT_MAX_SIZE`].
    pub fn normalize(&mut self) {
        if self.migrations_table.trim().is_empty() {
            self.migrations_table = default_migrations_table();
        }
        if self.multi_statement_max_size <= 0 {
            log::debug!(
                "multi-statement max size {} is not positive, using default",
                self.multi_statement_max_size
            );
            self.multi_statement_max_size = DEFAULT_MULTI_STATEMENT_MAX_SIZE;
        }
    }

    /// Consuming variant of [`normalize`](Self::normalize).
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Max statement size as a buffer length.
    ///
    /// Falls back to the default when the configured value is not positive or
    /// does not fit the platform's address space.
    pub fn max_statement_size(&self) -> usize {
        usize::try_from(self.multi_statement_max_size)
            .ok()
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_MULTI_STATEMENT_MAX_SIZE as usize)
    }

    /// Apply a single `key=value` option, as found in a connection string.
    ///
    /// Returns `Ok(false)` when the key is not a driver option so callers can
    /// pass it through to the backend untouched.
    pub fn apply_option(&mut self, key: &str, value: &str) -> CoreResult<bool> {
        let name = key.strip_prefix("x-").unwrap_or(key);
        match name {
            OPTION_MIGRATIONS_TABLE => {
                self.migrations_table = value.to_string();
            }
            OPTION_MULTI_STATEMENT => {
                self.multi_statement = value.parse().map_err(|_| CoreError::ConfigInvalid {
                    key: key.to_string(),
                    value: value.to_string(),
                    message: "expected 'true' or 'false'".to_string(),
                })?;
            }
            OPTION_MULTI_STATEMENT_MAX_SIZE => {
                self.multi_statement_max_size =
                    value.parse().map_err(|e| CoreError::ConfigInvalid {
                        key: key.to_string(),
                        value: value.to_string(),
                        message: format!("expected an integer byte count ({e})"),
                    })?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
