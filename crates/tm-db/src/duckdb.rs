//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{CatalogObject, Database, ExecMode, ObjectKind};
use crate::value::{Row, Value};
use async_trait::async_trait;
use duckdb::types::Value as DuckValue;
use duckdb::Connection;
use std::path::Path;
use std::sync::Mutex;
use tm_core::sql_utils::{escape_literal, split_qualified_name};

/// Locations that open an in-memory database instead of a file.
const MEMORY_LOCATIONS: [&str; 3] = ["", ":memory:", "memory"];

/// Every user-created object in the open database, in drop order. Objects
/// that reference others come first: views before tables, tables before the
/// sequences and types their columns use, schemas last once they are empty.
const LIST_OBJECTS_SQL: &str = "\
SELECT 0 AS phase, table_schema AS schema_name, table_name AS object_name, 'view' AS kind \
  FROM information_schema.tables \
  WHERE table_catalog = current_database() AND table_type = 'VIEW' \
UNION ALL \
SELECT 1, table_schema, table_name, 'table' \
  FROM information_schema.tables \
  WHERE table_catalog = current_database() AND table_type <> 'VIEW' \
UNION ALL \
SELECT DISTINCT 2, schema_name, function_name, function_type \
  FROM duckdb_functions() \
  WHERE database_name = current_database() AND NOT internal \
    AND function_type IN ('macro', 'table_macro') \
UNION ALL \
SELECT 3, schema_name, sequence_name, 'sequence' \
  FROM duckdb_sequences() \
  WHERE database_name = current_database() \
UNION ALL \
SELECT DISTINCT 4, schema_name, type_name, 'type' \
  FROM duckdb_types() \
  WHERE database_name = current_database() AND NOT internal \
UNION ALL \
SELECT 5, schema_name, schema_name, 'schema' \
  FROM duckdb_schemas() \
  WHERE database_name = current_database() AND NOT internal AND schema_name <> 'main' \
ORDER BY phase, schema_name, object_name";

/// DuckDB database backend
///
/// DuckDB plans DDL and DML through the same engine, so `ExecMode` only
/// decides how a statement is submitted: schema statements go through
/// `execute_batch`, everything else through `execute`.
pub struct DuckDbBackend {
    conn: Mutex<Option<Connection>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from a location string (empty, `:memory:` and `memory` open in memory)
    pub fn new(location: &str) -> DbResult<Self> {
        if MEMORY_LOCATIONS.contains(&location) {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(location))
        }
    }

    /// Wrap an already-open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    fn with_conn<T>(&self, body: impl FnOnce(&mut Connection) -> DbResult<T>) -> DbResult<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        let conn = guard.as_mut().ok_or(DbError::Closed)?;
        body(conn)
    }

    fn ping_sync(&self) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
                .map(|_| ())
                .map_err(|e| DbError::ConnectionError(e.to_string()))
        })
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, mode: ExecMode, sql: &str) -> DbResult<usize> {
        log::debug!("duckdb [{mode}]: {sql}");
        self.with_conn(|conn| match mode {
            ExecMode::Schema => conn
                .execute_batch(sql)
                .map(|_| 0)
                .map_err(|e| DbError::from_duckdb(e, sql)),
            ExecMode::Scan | ExecMode::Data => conn
                .execute(sql, [])
                .map_err(|e| DbError::from_duckdb(e, sql)),
        })
    }

    /// Query rows synchronously
    fn query_sync(&self, mode: ExecMode, sql: &str) -> DbResult<Vec<Row>> {
        log::debug!("duckdb [{mode}] query: {sql}");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(|e| DbError::from_duckdb(e, sql))?;

            // Column metadata is only reliable once the statement has run,
            // so each row reports its own column count.
            let rows = stmt
                .query_map([], |row| {
                    let column_count = row.as_ref().column_count();
                    (0..column_count)
                        .map(|i| row.get::<_, DuckValue>(i).map(from_duckdb_value))
                        .collect::<duckdb::Result<Vec<_>>>()
                })
                .map_err(|e| DbError::from_duckdb(e, sql))?;

            let collected = rows
                .map(|row| row.map(Row::new))
                .collect::<duckdb::Result<Vec<_>>>()
                .map_err(|e| DbError::from_duckdb(e, sql));
            collected
        })
    }

    /// Execute one statement in a BEGIN / COMMIT pair synchronously
    fn execute_in_transaction_sync(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        log::debug!("duckdb [transaction]: {sql}");
        self.with_conn(|conn| {
            let tx = conn
                .transaction()
                .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;

            // Dropping `tx` without committing rolls the insert back.
            let affected = tx
                .execute(sql, duckdb::params_from_iter(params.iter().map(to_duckdb_value)))
                .map_err(|e| DbError::from_duckdb(e, sql))?;

            tx.commit()
                .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))?;
            Ok(affected)
        })
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = split_qualified_name(name);
        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_catalog = current_database() AND table_schema = '{}' AND table_name = '{}'",
            escape_literal(schema),
            escape_literal(table)
        );

        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row(&sql, [], |row| row.get(0))
                .map_err(|e| DbError::CatalogError {
                    sql: sql.clone(),
                    message: e.to_string(),
                })?;
            Ok(count > 0)
        })
    }

    /// Enumerate user objects synchronously
    fn list_objects_sync(&self) -> DbResult<Vec<CatalogObject>> {
        let catalog_err = |e: duckdb::Error| DbError::CatalogError {
            sql: LIST_OBJECTS_SQL.to_string(),
            message: e.to_string(),
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(LIST_OBJECTS_SQL).map_err(catalog_err)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })
                .map_err(catalog_err)?;

            let mut objects = Vec::new();
            for row in rows {
                let (schema, name, kind) = row.map_err(catalog_err)?;
                let Some(kind) = object_kind(&kind) else {
                    log::debug!("Skipping catalog entry {schema}.{name} of kind {kind}");
                    continue;
                };
                objects.push(CatalogObject { schema, name, kind });
            }
            Ok(objects)
        })
    }

    fn close_sync(&self) -> DbResult<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
        let conn = guard.take().ok_or(DbError::Closed)?;
        conn.close().map_err(|(conn, e)| {
            *guard = Some(conn);
            DbError::ConnectionError(format!("close failed: {e}"))
        })
    }
}

fn object_kind(kind: &str) -> Option<ObjectKind> {
    match kind {
        "view" => Some(ObjectKind::View),
        "table" => Some(ObjectKind::Table),
        "macro" => Some(ObjectKind::Macro),
        "table_macro" => Some(ObjectKind::TableMacro),
        "sequence" => Some(ObjectKind::Sequence),
        "type" => Some(ObjectKind::Type),
        "schema" => Some(ObjectKind::Schema),
        _ => None,
    }
}

fn to_duckdb_value(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Boolean(v) => DuckValue::Boolean(*v),
        Value::BigInt(v) => DuckValue::BigInt(*v),
        Value::UBigInt(v) => DuckValue::UBigInt(*v),
        Value::Double(v) => DuckValue::Double(*v),
        Value::Text(v) => DuckValue::Text(v.clone()),
    }
}

fn from_duckdb_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(v) => Value::Boolean(v),
        DuckValue::TinyInt(v) => Value::BigInt(v.into()),
        DuckValue::SmallInt(v) => Value::BigInt(v.into()),
        DuckValue::Int(v) => Value::BigInt(v.into()),
        DuckValue::BigInt(v) => Value::BigInt(v),
        DuckValue::HugeInt(v) => i64::try_from(v)
            .map(Value::BigInt)
            .unwrap_or_else(|_| Value::Text(v.to_string())),
        DuckValue::UTinyInt(v) => Value::UBigInt(v.into()),
        DuckValue::USmallInt(v) => Value::UBigInt(v.into()),
        DuckValue::UInt(v) => Value::UBigInt(v.into()),
        DuckValue::UBigInt(v) => Value::UBigInt(v),
        DuckValue::Float(v) => Value::Double(v.into()),
        DuckValue::Double(v) => Value::Double(v),
        DuckValue::Text(v) => Value::Text(v),
        other => Value::Text(format!("{other:?}")),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn ping(&self) -> DbResult<()> {
        self.ping_sync()
    }

    async fn execute(&self, mode: ExecMode, sql: &str) -> DbResult<usize> {
        self.execute_sync(mode, sql)
    }

    async fn query(&self, mode: ExecMode, sql: &str) -> DbResult<Vec<Row>> {
        self.query_sync(mode, sql)
    }

    async fn execute_in_transaction(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        self.execute_in_transaction_sync(sql, params)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn list_objects(&self) -> DbResult<Vec<CatalogObject>> {
        self.list_objects_sync()
    }

    async fn close(&self) -> DbResult<()> {
        self.close_sync()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
