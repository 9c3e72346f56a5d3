//! Database trait definition

use crate::error::DbResult;
use crate::value::{Row, Value};
use async_trait::async_trait;
use std::fmt;
use tm_core::sql_utils::quote_ident;
use tm_core::StatementKind;

/// Execution path a statement is sent through.
///
/// Engines that plan catalog changes differently from data operations reject
/// DDL issued on the wrong path, so every call names its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecMode {
    /// Catalog-altering statements (CREATE, ALTER, DROP)
    Schema,
    /// Read-only catalog and metadata scans
    Scan,
    /// Ordinary data statements
    Data,
}

impl From<StatementKind> for ExecMode {
    fn from(kind: StatementKind) -> Self {
        match kind {
            StatementKind::Schema => ExecMode::Schema,
            StatementKind::Data => ExecMode::Data,
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecMode::Schema => write!(f, "schema"),
            ExecMode::Scan => write!(f, "scan"),
            ExecMode::Data => write!(f, "data"),
        }
    }
}

/// Kind of catalog object returned by [`Database::list_objects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    View,
    Table,
    Macro,
    TableMacro,
    Sequence,
    Type,
    Schema,
}

impl ObjectKind {
    fn keyword(self) -> &'static str {
        match self {
            ObjectKind::View => "VIEW",
            ObjectKind::Table => "TABLE",
            ObjectKind::Macro => "MACRO",
            ObjectKind::TableMacro => "MACRO TABLE",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Type => "TYPE",
            ObjectKind::Schema => "SCHEMA",
        }
    }
}

/// A user-created object in the migration target.
///
/// For [`ObjectKind::Schema`] `schema` and `name` are both the schema name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogObject {
    pub schema: String,
    pub name: String,
    pub kind: ObjectKind,
}

impl CatalogObject {
    /// Quoted name, schema-qualified for everything but schemas.
    pub fn quoted_name(&self) -> String {
        match self.kind {
            ObjectKind::Schema => quote_ident(&self.name),
            _ => format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name)),
        }
    }

    /// The DROP statement for this object.
    pub fn drop_sql(&self) -> String {
        format!("DROP {} {}", self.kind.keyword(), self.quoted_name())
    }
}

/// Database abstraction consumed by the migration driver
///
/// Implementations must be Send + Sync for async operation. Callers never
/// issue concurrent calls on one instance.
#[async_trait]
pub trait Database: Send + Sync {
    /// Verify the connection is usable
    async fn ping(&self) -> DbResult<()>;

    /// Execute one statement, returns affected rows
    async fn execute(&self, mode: ExecMode, sql: &str) -> DbResult<usize>;

    /// Run a query and collect every row
    async fn query(&self, mode: ExecMode, sql: &str) -> DbResult<Vec<Row>>;

    /// Execute one parameterized statement inside its own transaction,
    /// committing before returning
    async fn execute_in_transaction(&self, sql: &str, params: &[Value]) -> DbResult<usize>;

    /// Check the catalog for a table or view (optionally schema-qualified)
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Enumerate every user-created object, in an order that can be dropped
    /// front to back: views, tables, macros, sequences, types, then schemas
    async fn list_objects(&self) -> DbResult<Vec<CatalogObject>>;

    /// Release the connection; later calls fail with `DbError::Closed`
    async fn close(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(schema: &str, name: &str, kind: ObjectKind) -> CatalogObject {
        CatalogObject {
            schema: schema.to_string(),
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn test_drop_sql_per_kind() {
        assert_eq!(
            object("main", "v", ObjectKind::View).drop_sql(),
            r#"DROP VIEW "main"."v""#
        );
        assert_eq!(
            object("main", "numbers", ObjectKind::TableMacro).drop_sql(),
            r#"DROP MACRO TABLE "main"."numbers""#
        );
        assert_eq!(
            object("main", "twice", ObjectKind::Macro).drop_sql(),
            r#"DROP MACRO "main"."twice""#
        );
        assert_eq!(
            object("ops", "seq", ObjectKind::Sequence).drop_sql(),
            r#"DROP SEQUENCE "ops"."seq""#
        );
        assert_eq!(
            object("main", "mood", ObjectKind::Type).drop_sql(),
            r#"DROP TYPE "main"."mood""#
        );
    }

    #[test]
    fn test_schema_is_not_qualified() {
        assert_eq!(
            object("meta", "meta", ObjectKind::Schema).drop_sql(),
            r#"DROP SCHEMA "meta""#
        );
    }
}
