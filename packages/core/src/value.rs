//! The Value type - one slot of a record.

use crate::Record;

/// A loosely-typed value held by a [`Record`] field.
///
/// # Design Notes
///
/// - Nested objects are `Record`s, sequences are `Array`s
/// - Map fields are encoded either as an `Array` of `[key, value]` pairs or
///   as a `Record` keyed by the key's text
/// - Uses `i64` for integers; unsigned values above `i64::MAX` do not fit
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Nested record.
    Record(Record),
}

impl Value {
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// Create an empty record.
    pub fn record() -> Self {
        Value::Record(Record::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text form of a scalar, used when a map key becomes a record field name.
    pub fn key_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(Value::null().kind_name(), "null");
        assert_eq!(Value::from(3).kind_name(), "integer");
        assert_eq!(Value::from("x").kind_name(), "string");
        assert_eq!(Value::record().kind_name(), "record");
        assert_eq!(Value::array().kind_name(), "array");
    }

    #[test]
    fn vec_conversion_nests() {
        let value = Value::from(vec![1i64, 2, 3]);
        assert_eq!(
            value.as_array(),
            Some(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)][..])
        );
    }

    #[test]
    fn key_text_only_for_scalars() {
        assert_eq!(Value::from(7).key_text(), Some("7".to_string()));
        assert_eq!(Value::from("red").key_text(), Some("red".to_string()));
        assert_eq!(Value::Bool(true).key_text(), Some("true".to_string()));
        assert_eq!(Value::null().key_text(), None);
        assert_eq!(Value::array().key_text(), None);
    }
}
