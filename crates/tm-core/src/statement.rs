//! Statement classification

use serde::Serialize;
use std::fmt;

/// Leading keywords that mark a statement as schema-defining.
const SCHEMA_PREFIXES: [&[u8]; 3] = [b"CREATE", b"ALTER", b"DROP"];

/// How a statement must be routed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Catalog change: CREATE, ALTER or DROP
    Schema,
    /// Anything else
    Data,
}

impl StatementKind {
    /// Classify by a case-insensitive prefix check on the trimmed statement.
    ///
    /// This is a heuristic, not a parser: a schema statement preceded by a
    /// comment is classified as data, and any statement whose text merely
    /// starts with one of the keywords (`DROPPED_ROWS ...`) counts as schema.
    /// Only ASCII whitespace is trimmed here; callers holding decoded text
    /// trim Unicode whitespace before classifying.
    pub fn classify(statement: &[u8]) -> Self {
        let trimmed = statement.trim_ascii();
        let is_schema = SCHEMA_PREFIXES.iter().any(|prefix| {
            trimmed
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        });
        if is_schema {
            StatementKind::Schema
        } else {
            StatementKind::Data
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Schema => write!(f, "schema"),
            StatementKind::Data => write!(f, "data"),
        }
    }
}
