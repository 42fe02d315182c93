//! Conversions between records and `serde_json` values.

use recordmap_core::{Error, Record, Value};

/// Convert a Value to serde_json::Value.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        // JSON has no NaN or infinity
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Record(record) => record_to_json(record),
    }
}

/// Convert serde_json::Value to a Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Record(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

/// Convert a Record to a JSON object.
pub fn record_to_json(record: Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .into_iter()
            .map(|(k, v)| (k, value_to_json(v)))
            .collect(),
    )
}

/// Convert a JSON object to a Record.
///
/// # Errors
///
/// `Other` when `json` is not an object.
pub fn json_to_record(json: serde_json::Value) -> Result<Record, Error> {
    match json_to_value(json) {
        Value::Record(record) => Ok(record),
        other => Err(Error::Other {
            message: format!("expected a JSON object, found {}", other.kind_name()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_to_value_numbers() {
        let record = json_to_record(json!({
            "integer": 42,
            "float": 2.75,
            "negative": -100
        }))
        .unwrap();

        assert_eq!(record.get("integer"), Some(&Value::Integer(42)));
        assert_eq!(record.get("negative"), Some(&Value::Integer(-100)));
        if let Some(Value::Float(f)) = record.get("float") {
            assert!((f - 2.75).abs() < 0.001);
        } else {
            panic!("expected float");
        }
    }

    #[test]
    fn nested_records_and_arrays() {
        let json = json!({ "Origin": { "X": 1, "Y": 2 }, "Tags": ["a", null] });
        let record = json_to_record(json.clone()).unwrap();
        let origin = record.get("Origin").and_then(Value::as_record).unwrap();
        assert_eq!(origin.get("Y"), Some(&Value::Integer(2)));
        assert_eq!(record_to_json(record), json);
    }

    #[test]
    fn nan_becomes_null() {
        assert_eq!(value_to_json(Value::Float(f64::NAN)), serde_json::Value::Null);
        assert_eq!(value_to_json(Value::Float(f64::INFINITY)), serde_json::Value::Null);
    }

    #[test]
    fn records_must_be_objects() {
        let err = json_to_record(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
        assert!(json_to_record(json!("x")).is_err());
    }
}
