//! Backend-neutral parameter and column values

use crate::error::{DbError, DbResult};
use std::fmt;

/// A bound parameter or a scanned column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    /// Any signed integer up to 64 bits
    BigInt(i64),
    /// Any unsigned integer up to 64 bits
    UBigInt(u64),
    Double(f64),
    Text(String),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::BigInt(_) => "BIGINT",
            Value::UBigInt(_) => "UBIGINT",
            Value::Double(_) => "DOUBLE",
            Value::Text(_) => "VARCHAR",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::UBigInt(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UBigInt(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UBigInt(u64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One result row, columns in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    fn column(&self, index: usize, expected: &'static str) -> DbResult<&Value> {
        self.0.get(index).ok_or_else(|| DbError::TypeMismatch {
            index,
            expected,
            found: format!("nothing (row has {} columns)", self.0.len()),
        })
    }

    fn mismatch(index: usize, expected: &'static str, found: &Value) -> DbError {
        DbError::TypeMismatch {
            index,
            expected,
            found: format!("{} {}", found.type_name(), found),
        }
    }

    /// Read a column as `i64`.
    pub fn get_i64(&self, index: usize) -> DbResult<i64> {
        match self.column(index, "BIGINT")? {
            Value::BigInt(v) => Ok(*v),
            other @ Value::UBigInt(v) => {
                i64::try_from(*v).map_err(|_| Self::mismatch(index, "BIGINT", other))
            }
            other => Err(Self::mismatch(index, "BIGINT", other)),
        }
    }

    /// Read a column as `u64`.
    pub fn get_u64(&self, index: usize) -> DbResult<u64> {
        match self.column(index, "UBIGINT")? {
            Value::UBigInt(v) => Ok(*v),
            other @ Value::BigInt(v) => {
                u64::try_from(*v).map_err(|_| Self::mismatch(index, "UBIGINT", other))
            }
            other => Err(Self::mismatch(index, "UBIGINT", other)),
        }
    }

    /// Read a column as a flag: booleans directly, integers as `!= 0`.
    pub fn get_bool(&self, index: usize) -> DbResult<bool> {
        match self.column(index, "BOOLEAN")? {
            Value::Boolean(v) => Ok(*v),
            Value::BigInt(v) => Ok(*v != 0),
            Value::UBigInt(v) => Ok(*v != 0),
            other => Err(Self::mismatch(index, "BOOLEAN", other)),
        }
    }

    /// Read a column as text.
    pub fn get_str(&self, index: usize) -> DbResult<&str> {
        match self.column(index, "VARCHAR")? {
            Value::Text(v) => Ok(v),
            other => Err(Self::mismatch(index, "VARCHAR", other)),
        }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}
