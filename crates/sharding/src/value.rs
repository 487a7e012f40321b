//! SQL values used for parameters, literals and sharding keys.
//!
//! [`SqlValue`] is the single value model shared by the statement context
//! (literal expressions), the parameter lists handed to the executor and the
//! sharding algorithms that turn a value into a target name.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar SQL value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Character data.
    Text(String),
}

impl SqlValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(value.into())
    }

    /// Returns true for `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Returns the value as an integer when it has an exact integer form.
    ///
    /// Text is parsed, so `'42'` used as a sharding value behaves like `42`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::Bool(v) => Some(i64::from(*v)),
            SqlValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the canonical text form used for hashing.
    pub fn canonical_text(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(v) => v.to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::Float(v) => v.to_string(),
            SqlValue::Text(s) => s.clone(),
        }
    }

    /// Renders the value as a SQL literal.
    ///
    /// Text is single-quoted with embedded quotes doubled.
    pub fn to_sql_literal(&self) -> String {
        match self {
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            other => other.canonical_text(),
        }
    }

    /// Compares two values for range checks.
    ///
    /// Numeric values compare numerically (text that parses as an integer
    /// counts as numeric), text compares lexically. `NULL` and mixed
    /// non-numeric kinds are incomparable.
    pub fn compare(&self, other: &SqlValue) -> Option<Ordering> {
        match (self, other) {
            (SqlValue::Null, _) | (_, SqlValue::Null) => None,
            (SqlValue::Float(a), b) => b.as_f64().and_then(|b| a.partial_cmp(&b)),
            (a, SqlValue::Float(b)) => a.as_f64().and_then(|a| a.partial_cmp(b)),
            (SqlValue::Text(a), SqlValue::Text(b)) => match (self.as_i64(), other.as_i64()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => Some(a.cmp(b)),
            },
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => None,
            },
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Float(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql_literal())
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

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_i64() {
        assert_eq!(SqlValue::Int(7).as_i64(), Some(7));
        assert_eq!(SqlValue::text(" 12 ").as_i64(), Some(12));
        assert_eq!(SqlValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(SqlValue::Float(3.5).as_i64(), None);
        assert_eq!(SqlValue::Null.as_i64(), None);
    }

    #[test]
    fn test_sql_literal_escapes_quotes() {
        assert_eq!(SqlValue::text("O'Brien").to_sql_literal(), "'O''Brien'");
        assert_eq!(SqlValue::Int(5).to_sql_literal(), "5");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
    }

    #[test]
    fn test_compare() {
        assert_eq!(SqlValue::Int(1).compare(&SqlValue::Int(2)), Some(Ordering::Less));
        assert_eq!(
            SqlValue::text("10").compare(&SqlValue::Int(9)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            SqlValue::Float(1.5).compare(&SqlValue::Int(1)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            SqlValue::text("b").compare(&SqlValue::text("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(SqlValue::Null.compare(&SqlValue::Int(1)), None);
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<SqlValue> = serde_json::from_str(r#"[1, "a", null, true, 2.5]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Int(1),
                SqlValue::text("a"),
                SqlValue::Null,
                SqlValue::Bool(true),
                SqlValue::Float(2.5),
            ]
        );
    }
}
