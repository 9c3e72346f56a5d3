//! Migration script execution

use crate::error::{MigrateError, MigrateResult};
use std::io::Read;
use tm_core::{DriverConfig, StatementKind, Statements};
use tm_db::{Database, ExecMode};

/// Counts of statements executed by one script, per execution mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub schema_statements: usize,
    pub data_statements: usize,
}

impl ExecutionSummary {
    pub fn total(&self) -> usize {
        self.schema_statements + self.data_statements
    }

    fn record(&mut self, mode: ExecMode) {
        match mode {
            ExecMode::Schema => self.schema_statements += 1,
            ExecMode::Scan | ExecMode::Data => self.data_statements += 1,
        }
    }
}

/// Runs the statements of a script against a database, in order.
///
/// Execution stops at the first failing statement. Statements that already
/// ran are not rolled back and nothing wraps the script in a transaction.
pub struct MigrationExecutor<'a> {
    db: &'a dyn Database,
    config: &'a DriverConfig,
}

impl<'a> MigrationExecutor<'a> {
    pub fn new(db: &'a dyn Database, config: &'a DriverConfig) -> Self {
        Self { db, config }
    }

    /// Execute every statement of `script`.
    ///
    /// Splitting follows the config: one statement per delimiter in
    /// multi-statement mode, the whole script otherwise. A splitter failure
    /// (size cap, read error) is returned before the offending statement
    /// reaches the database.
    pub async fn execute<R: Read + Send>(&self, script: R) -> MigrateResult<ExecutionSummary> {
        let mut summary = ExecutionSummary::default();

        for statement in Statements::for_config(script, self.config) {
            let statement = statement?;
            let sql = std::str::from_utf8(statement.trim_ascii()).map_err(|_| {
                MigrateError::InvalidStatement {
                    statement: statement.trim_ascii().to_vec(),
                }
            })?;
            // Unicode whitespace (e.g. a leading no-break space) goes too, so
            // it cannot hide a CREATE from the classifier.
            let sql = sql.trim();
            if sql.is_empty() {
                continue;
            }

            let mode = ExecMode::from(StatementKind::classify(sql.as_bytes()));
            log::debug!("Executing {mode} statement: {sql}");
            self.db
                .execute(mode, sql)
                .await
                .map_err(|source| MigrateError::Migration {
                    statement: sql.as_bytes().to_vec(),
                    source,
                })?;
            summary.record(mode);
        }

        log::debug!(
            "Script finished: {} schema, {} data statements",
            summary.schema_statements,
            summary.data_statements
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
