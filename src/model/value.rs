//! Typed property values carried by property-set operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A property value as written by an ingest job or interactive edit.
///
/// Serialized as `{"type": "<kind>", "value": ...}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropValue {
    /// Explicit absence of a value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer.
    UInt(u64),
    /// Double-precision float.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Nanoseconds since the Unix epoch.
    Timestamp(i64),
    /// List of signed integers.
    IntList(Vec<i64>),
    /// List of floats.
    FloatList(Vec<f64>),
    /// List of strings.
    StrList(Vec<String>),
}

impl PropValue {
    /// Short name of the value's type, as used in the serialized tag.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "u_int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Timestamp(_) => "timestamp",
            Self::IntList(_) => "int_list",
            Self::FloatList(_) => "float_list",
            Self::StrList(_) => "str_list",
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::IntList(v) => write!(f, "{v:?}"),
            Self::FloatList(v) => write!(f, "{v:?}"),
            Self::StrList(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for PropValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_type_name() {
        let values = [
            PropValue::Null,
            PropValue::Bool(true),
            PropValue::Int(-3),
            PropValue::UInt(3),
            PropValue::Float(0.5),
            PropValue::from("red"),
            PropValue::Timestamp(1),
            PropValue::IntList(vec![1]),
            PropValue::FloatList(vec![1.0]),
            PropValue::StrList(vec!["a".to_owned()]),
        ];
        for v in values {
            let json = serde_json::to_value(&v).unwrap();
            assert_eq!(json["type"], v.type_name(), "tag for {v}");
        }
    }

    #[test]
    fn deserialize_tagged() {
        let v: PropValue = serde_json::from_str(r#"{"type":"str","value":"blue"}"#).unwrap();
        assert_eq!(v, PropValue::Str("blue".to_owned()));
        let v: PropValue = serde_json::from_str(r#"{"type":"null"}"#).unwrap();
        assert_eq!(v, PropValue::Null);
    }

    #[test]
    fn display() {
        assert_eq!(PropValue::from("x").to_string(), "\"x\"");
        assert_eq!(PropValue::Int(4).to_string(), "4");
        assert_eq!(PropValue::Null.to_string(), "null");
    }
}
