//! Value conversion and the single setter shared by every shape.

use serde_json::{Number, Value};

use super::{Shape, ValueType};
use crate::errors::KeywordError;
use crate::types::Document;

impl ValueType {
    /// Convert a raw string into a JSON value of this type.
    pub fn transform(&self, key: &str, raw: &str) -> Result<Value, KeywordError> {
        let invalid = |expected| KeywordError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected,
        };
        match self {
            ValueType::Str => Ok(Value::String(raw.to_string())),
            ValueType::Int => raw
                .trim()
                .parse::<i64>()
                .map(|v| Value::Number(v.into()))
                .map_err(|_| invalid("an integer")),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| invalid("a finite float")),
        }
    }

    /// Coerce an already-typed value (e.g. from a TOML file) to this type.
    pub fn coerce(&self, key: &str, value: &Value) -> Result<Value, KeywordError> {
        match (self, value) {
            (ValueType::Str, Value::String(_)) => Ok(value.clone()),
            (ValueType::Int, Value::Number(n)) if n.is_i64() => Ok(value.clone()),
            (ValueType::Float, Value::Number(n)) => n
                .as_f64()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| KeywordError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "a finite float",
                }),
            (_, Value::String(s)) => self.transform(key, s),
            (_, other) => self.transform(key, &other.to_string()),
        }
    }
}

/// Apply `value` to `doc[key]` according to `shape`, reporting whether the
/// document changed.
///
/// `Scalar` replaces the stored value unless it is already equal.
/// `AppendSet` normalizes a stored scalar into a one-element list, then
/// appends each element of `value` (a scalar or a list) not already present.
pub fn apply_value(shape: Shape, doc: &mut Document, key: &str, value: Value) -> bool {
    match shape {
        Shape::Scalar => {
            if doc.get(key) == Some(&value) {
                return false;
            }
            doc.insert(key.to_string(), value);
            true
        }
        Shape::AppendSet => {
            let incoming = match value {
                Value::Array(items) => items,
                other => vec![other],
            };
            let (mut current, mut changed) = match doc.remove(key) {
                Some(Value::Array(items)) => (items, false),
                Some(scalar) => (vec![scalar], true),
                None => (Vec::new(), true),
            };
            for item in incoming {
                if !current.contains(&item) {
                    current.push(item);
                    changed = true;
                }
            }
            doc.insert(key.to_string(), Value::Array(current));
            changed
        }
    }
}
