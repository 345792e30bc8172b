//! Column values handed to the executor.
//!
//! Rows are built from typed values and rendered by the database driver,
//! never by string concatenation.

use std::fmt;

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlValue {
    Null,
    Int(i64),
    Text(String),
}

/// One row of values, in the column order of its insert statement.
pub type Row = Vec<SqlValue>;

impl SqlValue {
    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(value.into())
    }

    /// Enum-style flag columns are stored as quoted digits (`'0'`, `'1'`).
    pub fn flag(value: u8) -> Self {
        SqlValue::Text(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view; text holding digits is parsed like the database would.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(value) => Some(*value),
            SqlValue::Text(value) => value.parse().ok(),
            SqlValue::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        SqlValue::Int(value as i64)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Int(value) => write!(f, "{value}"),
            SqlValue::Text(value) => write!(f, "{value:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(SqlValue::from(7i64), SqlValue::Int(7));
        assert_eq!(SqlValue::from("a"), SqlValue::Text("a".to_string()));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3i64)), SqlValue::Int(3));
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(SqlValue::Int(4).as_i64(), Some(4));
        assert_eq!(SqlValue::flag(1).as_i64(), Some(1));
        assert_eq!(SqlValue::text("host_1").as_i64(), None);
        assert_eq!(SqlValue::Null.as_i64(), None);
    }
}
