//! Discriminated scalar type for telemetry fields.
//!
//! Device reports mix numbers, flags, strings, and explicit nulls in the
//! same field positions. Every accessor is total: "absent" and "wrong
//! type" are ordinary `None` results, never panics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single telemetry field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric value (integers and floats collapse to f64).
    Number(f64),
    /// Boolean flag.
    Bool(bool),
    /// Free-form text (status strings, model names, versions).
    Text(String),
    /// Explicit null in the source report.
    Null,
}

impl FieldValue {
    /// The value as a number, if it is one. Booleans do not coerce here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Bool(_) | FieldValue::Text(_) | FieldValue::Null => None,
        }
    }

    /// The value as a number with boolean coercion (true → 1.0, false → 0.0).
    ///
    /// Used for flag-like feature columns such as `license_expired`.
    pub fn to_numeric(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Text(_) | FieldValue::Null => None,
        }
    }

    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Number(_) | FieldValue::Bool(_) | FieldValue::Null => None,
        }
    }

    /// Whether this is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Whether this reads as a set flag: `true` or a non-zero number.
    pub fn is_set_flag(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(_) | FieldValue::Null => false,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Number(f64::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_bools_separate_under_as_number() {
        assert_eq!(FieldValue::Number(3.5).as_number(), Some(3.5));
        assert_eq!(FieldValue::Bool(true).as_number(), None);
        assert_eq!(FieldValue::Null.as_number(), None);
        assert_eq!(FieldValue::from("85").as_number(), None);
    }

    #[test]
    fn to_numeric_coerces_bools() {
        assert_eq!(FieldValue::Bool(true).to_numeric(), Some(1.0));
        assert_eq!(FieldValue::Bool(false).to_numeric(), Some(0.0));
        assert_eq!(FieldValue::Number(2.0).to_numeric(), Some(2.0));
        assert_eq!(FieldValue::Null.to_numeric(), None);
    }

    #[test]
    fn set_flag_reads_truthy_values() {
        assert!(FieldValue::Bool(true).is_set_flag());
        assert!(FieldValue::Number(1.0).is_set_flag());
        assert!(!FieldValue::Number(0.0).is_set_flag());
        assert!(!FieldValue::from("yes").is_set_flag());
    }

    #[test]
    fn untagged_serde_round_trip() {
        let v: FieldValue = serde_json::from_str("42.5").unwrap();
        assert_eq!(v, FieldValue::Number(42.5));
        let v: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FieldValue::Bool(true));
        let v: FieldValue = serde_json::from_str("\"EXPIRED\"").unwrap();
        assert_eq!(v.as_text(), Some("EXPIRED"));
        let v: FieldValue = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
    }
}
