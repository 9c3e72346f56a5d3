//! Quoting for the SQL the driver generates itself
//!
//! The migrations table name is user configuration and ends up in every
//! statement the version store builds, so it is always quoted. Catalog
//! lookups compare against it as a string literal instead.

/// Schema a migrations table lives in when its name has no schema part.
pub const DEFAULT_SCHEMA: &str = "main";

/// Double-quote an identifier. Embedded `"` characters are doubled.
pub fn quote_ident(ident: &str) -> String {
    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push('"');
    for ch in ident.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Split a migrations table name at its last dot into `(schema, table)`.
///
/// ```
/// use tm_core::sql_utils::split_qualified_name;
/// assert_eq!(split_qualified_name("schema_migrations"), ("main", "schema_migrations"));
/// assert_eq!(split_qualified_name("ops.schema_migrations"), ("ops", "schema_migrations"));
/// ```
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or((DEFAULT_SCHEMA, name))
}

/// Quoted, always schema-qualified form of a migrations table name.
///
/// A dotted schema part (`catalog.schema`) is quoted piece by piece so the
/// catalog survives.
pub fn qualified_table(name: &str) -> String {
    let (schema, table) = split_qualified_name(name);
    schema
        .split('.')
        .chain(std::iter::once(table))
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Make a value safe to place between single quotes.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
