//! Error types for tm-driver

use thiserror::Error;
use tm_core::CoreError;
use tm_db::DbError;

/// Migration driver errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration, connection-string, script-read or size-exceeded errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Initial ping or open failed (M001)
    #[error("[M001] Database connection failed")]
    Connection(#[source] DbError),

    /// Checking for or creating the migrations table failed (M002)
    #[error("[M002] Migrations table setup failed; query: {query}")]
    Catalog {
        query: String,
        #[source]
        source: DbError,
    },

    /// A statement of a migration script failed (M003)
    #[error("[M003] Migration failed; statement: {}", String::from_utf8_lossy(.statement))]
    Migration {
        statement: Vec<u8>,
        #[source]
        source: DbError,
    },

    /// A statement is not valid UTF-8 and cannot be sent to the engine (M004)
    #[error("[M004] Migration statement is not valid UTF-8: {}", String::from_utf8_lossy(.statement))]
    InvalidStatement { statement: Vec<u8> },

    /// Reading or writing version records failed (M005)
    #[error("[M005] Version store query failed; query: {query}")]
    Store {
        query: String,
        #[source]
        source: DbError,
    },

    /// Dropping the migration target failed (M006)
    #[error("[M006] Drop failed; query: {query}")]
    Drop {
        query: String,
        #[source]
        source: DbError,
    },

    /// Lock acquired while already held (M007)
    #[error("[M007] Migration lock is already held")]
    Locked,

    /// Lock released while not held (M008)
    #[error("[M008] Migration lock is not held")]
    NotLocked,

    /// No factory registered for a DSN scheme (M009)
    #[error("[M009] No migration driver registered for scheme '{0}'")]
    UnknownScheme(String),

    /// Closing the database failed (M010)
    #[error("[M010] Failed to close database")]
    Close(#[source] DbError),

    /// Several independent failures from one operation (M011)
    #[error("[M011] {} errors occurred: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<MigrateError>),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

fn join_errors(errors: &[MigrateError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl MigrateError {
    /// Combine two failures into one, flattening nested aggregates.
    pub fn combine(self, other: MigrateError) -> MigrateError {
        let mut errors = match self {
            MigrateError::Multiple(errors) => errors,
            single => vec![single],
        };
        match other {
            MigrateError::Multiple(more) => errors.extend(more),
            single => errors.push(single),
        }
        MigrateError::Multiple(errors)
    }

    /// True for the lock-state conditions.
    pub fn is_lock_error(&self) -> bool {
        matches!(self, MigrateError::Locked | MigrateError::NotLocked)
    }

    /// True when a statement exceeded the multi-statement size cap.
    pub fn is_size_exceeded(&self) -> bool {
        matches!(
            self,
            MigrateError::Core(CoreError::StatementTooLarge { .. })
        )
    }

    /// The failing statement of a migration error, if this is one.
    pub fn statement(&self) -> Option<&[u8]> {
        match self {
            MigrateError::Migration { statement, .. }
            | MigrateError::InvalidStatement { statement } => Some(statement.as_slice()),
            _ => None,
        }
    }
}
