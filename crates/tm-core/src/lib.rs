//! tm-core - Core library for Tidemark
//!
//! This crate provides the pieces of the migration driver that do not talk to
//! a database: driver configuration, connection-string parsing, the version
//! record model, and the lexical statement splitter used in multi-statement
//! mode.

pub mod config;
pub mod dsn;
pub mod error;
pub mod splitter;
pub mod sql_utils;
pub mod statement;
pub mod version;

pub use config::DriverConfig;
pub use dsn::ConnectionString;
pub use error::{CoreError, CoreResult};
pub use splitter::{StatementSplitter, Statements, DEFAULT_DELIMITER};
pub use statement::StatementKind;
pub use version::{SequenceGenerator, VersionRecord, VersionState, NIL_VERSION};
