//! Recording database double for unit tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tm_db::{CatalogObject, Database, DbError, DbResult, ExecMode, Row, Value};

/// Records every `execute` call and fails on request.
#[derive(Clone, Default)]
pub(crate) struct SpyDatabase {
    calls: Arc<Mutex<Vec<(ExecMode, String)>>>,
    fail_execute_at: Option<usize>,
    fail_ping: bool,
    fail_catalog: bool,
    fail_transaction: bool,
    table_exists: bool,
    objects: Vec<CatalogObject>,
    rejected_sql: Option<String>,
}

impl SpyDatabase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th execute call (1-based).
    pub(crate) fn failing_execute_at(mut self, n: usize) -> Self {
        self.fail_execute_at = Some(n);
        self
    }

    pub(crate) fn failing_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    pub(crate) fn failing_catalog(mut self) -> Self {
        self.fail_catalog = true;
        self
    }

    pub(crate) fn failing_transaction(mut self) -> Self {
        self.fail_transaction = true;
        self
    }

    pub(crate) fn with_existing_table(mut self) -> Self {
        self.table_exists = true;
        self
    }

    /// Objects reported by `list_objects`.
    pub(crate) fn with_objects(mut self, objects: Vec<CatalogObject>) -> Self {
        self.objects = objects;
        self
    }

    /// Fail every execute call whose SQL contains `fragment`.
    pub(crate) fn rejecting(mut self, fragment: &str) -> Self {
        self.rejected_sql = Some(fragment.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<(ExecMode, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for SpyDatabase {
    async fn ping(&self) -> DbResult<()> {
        if self.fail_ping {
            return Err(DbError::ConnectionError("spy: ping refused".to_string()));
        }
        Ok(())
    }

    async fn execute(&self, mode: ExecMode, sql: &str) -> DbResult<usize> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((mode, sql.to_string()));
        let rejected = self
            .rejected_sql
            .as_deref()
            .is_some_and(|fragment| sql.contains(fragment));
        if rejected || self.fail_execute_at == Some(calls.len()) {
            return Err(DbError::ExecutionError {
                sql: sql.to_string(),
                message: "spy: statement rejected".to_string(),
            });
        }
        Ok(0)
    }

    async fn query(&self, _mode: ExecMode, _sql: &str) -> DbResult<Vec<Row>> {
        Ok(Vec::new())
    }

    async fn execute_in_transaction(&self, sql: &str, _params: &[Value]) -> DbResult<usize> {
        if self.fail_transaction {
            return Err(DbError::TransactionError(format!("spy: COMMIT failed: {sql}")));
        }
        Ok(1)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        if self.fail_catalog {
            return Err(DbError::CatalogError {
                sql: format!("catalog lookup for {name}"),
                message: "spy: catalog unavailable".to_string(),
            });
        }
        Ok(self.table_exists)
    }

    async fn list_objects(&self) -> DbResult<Vec<CatalogObject>> {
        Ok(self.objects.clone())
    }

    async fn close(&self) -> DbResult<()> {
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "spy"
    }
}
