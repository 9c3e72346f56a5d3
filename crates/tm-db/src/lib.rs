//! tm-db - Database abstraction layer for Tidemark
//!
//! This crate provides the `Database` trait the migration driver talks to,
//! the execution modes it routes statements through, and a DuckDB
//! implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{CatalogObject, Database, ExecMode, ObjectKind};
pub use value::{Row, Value};
