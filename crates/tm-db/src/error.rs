//! Error types for tm-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {message}")]
    ExecutionError { sql: String, message: String },

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {message}")]
    TableNotFound { sql: String, message: String },

    /// Catalog metadata lookup failed (D004)
    #[error("[D004] Catalog query failed: {message}")]
    CatalogError { sql: String, message: String },

    /// Begin or commit failed (D005)
    #[error("[D005] Transaction failed: {0}")]
    TransactionError(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Column value could not be read as the requested type (D007)
    #[error("[D007] Column {index} holds {found}, expected {expected}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: String,
    },

    /// Connection already closed (D008)
    #[error("[D008] Database connection is closed")]
    Closed,
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a DuckDB error raised while running `sql`.
    ///
    /// duckdb::Error does not expose structured variants, so missing-relation
    /// errors are recognised from the message text. The patterns are narrow
    /// so function, type and schema errors stay execution errors.
    pub fn from_duckdb(err: duckdb::Error, sql: &str) -> Self {
        let message = err.to_string();
        let sql = sql.to_string();
        if message.contains("Table with name")
            || message.contains("View with name")
            || message.contains("Table or view with name")
            || (message.contains("Catalog Error")
                && message.contains("Table")
                && message.contains("not found"))
        {
            DbError::TableNotFound { sql, message }
        } else {
            DbError::ExecutionError { sql, message }
        }
    }

    /// The SQL text that produced this error, when there was one.
    pub fn sql(&self) -> Option<&str> {
        match self {
            DbError::ExecutionError { sql, .. }
            | DbError::TableNotFound { sql, .. }
            | DbError::CatalogError { sql, .. } => Some(sql),
            _ => None,
        }
    }

    /// True when the error reports a missing table or view.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::TableNotFound { .. })
    }
}
