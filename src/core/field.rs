//! Typed key/value fields carried by events

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Timestamp layout used for record timestamps and time-valued fields:
/// `2024-03-10T00:00:00.000+0800`
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Value type for structured logging fields
///
/// `int` and `int64` setters both land in [`FieldValue::Int`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Time(DateTime<FixedOffset>),
    /// Rendered error message
    Error(String),
    /// Arbitrary serializable value
    Any(serde_json::Value),
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Str(s) | FieldValue::Error(s) => serde_json::Value::String(s.clone()),
            FieldValue::Time(t) => {
                serde_json::Value::String(t.format(ISO8601_FORMAT).to_string())
            }
            FieldValue::Any(v) => v.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Str(s) | FieldValue::Error(s) => f.write_str(s),
            FieldValue::Time(t) => write!(f, "{}", t.format(ISO8601_FORMAT)),
            FieldValue::Any(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for FieldValue {
    fn from(t: DateTime<Tz>) -> Self {
        FieldValue::Time(t.fixed_offset())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Any(v)
    }
}

/// A single (key, value) pair in an event's ordered field sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_field_value_json() {
        assert_eq!(FieldValue::from(42).to_json_value(), serde_json::json!(42));
        assert_eq!(FieldValue::from("x").to_json_value(), serde_json::json!("x"));
        assert_eq!(FieldValue::from(true).to_json_value(), serde_json::json!(true));
        assert_eq!(
            FieldValue::Float(f64::NAN).to_json_value(),
            serde_json::Value::Null
        );
        assert_eq!(
            FieldValue::Error("boom".into()).to_json_value(),
            serde_json::json!("boom")
        );
    }

    #[test]
    fn test_time_value_format() {
        let t = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
        let value = FieldValue::from(t);
        assert_eq!(value.to_string(), "2024-03-10T08:30:00.000+0000");
    }

    #[test]
    fn test_field_keys_borrow_static() {
        let field = Field::new("request_id", "abc");
        assert!(matches!(field.key, Cow::Borrowed("request_id")));

        let owned = Field::new(format!("k{}", 1), 1);
        assert_eq!(owned.key, "k1");
    }
}
