//! Raw Input Records

use crate::FeatureError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A single raw field value as received at the system boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// JSON number or already-numeric form value
    Number(f64),
    /// Free text, e.g. a form submission or a categorical label
    Text(String),
    /// JSON boolean
    Flag(bool),
    /// Null, array or object: kept only so it can be reported
    Unsupported(String),
}

impl FieldValue {
    /// Coerce to a finite number, the way the model expects it
    pub fn to_f64(&self, field: &str) -> Result<f64, FeatureError> {
        let number = match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Unsupported(_) => None,
        };

        match number {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(FeatureError::TypeConversion {
                field: field.to_string(),
                value: self.to_string(),
            }),
        }
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::Flag(b) => write!(f, "{b}"),
            FieldValue::Unsupported(raw) => f.write_str(raw),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => FieldValue::Number(f),
                None => FieldValue::Unsupported(n.to_string()),
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Bool(b) => FieldValue::Flag(b),
            other => FieldValue::Unsupported(other.to_string()),
        }
    }
}

/// Name-keyed raw input for a single request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object
    pub fn from_json(value: Value) -> Result<Self, FeatureError> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(FeatureError::MalformedRecord(format!(
                "expected a JSON object of fields, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Numeric value of a field, if present
    pub fn number(&self, name: &str) -> Option<Result<f64, FeatureError>> {
        self.fields.get(name).map(|value| value.to_f64(name))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(FieldValue::Number(3.5).to_f64("x").unwrap(), 3.5);
        assert_eq!(FieldValue::Flag(true).to_f64("x").unwrap(), 1.0);
        assert_eq!(FieldValue::Flag(false).to_f64("x").unwrap(), 0.0);
        assert_eq!(FieldValue::from(" 42 ").to_f64("x").unwrap(), 42.0);
    }

    #[test]
    fn test_coercion_failures_name_the_field() {
        let err = FieldValue::from("high").to_f64("cholesterol").unwrap_err();
        assert_eq!(
            err,
            FeatureError::TypeConversion {
                field: "cholesterol".to_string(),
                value: "\"high\"".to_string(),
            }
        );

        assert!(FieldValue::Unsupported("null".to_string()).to_f64("x").is_err());
        assert!(FieldValue::from("NaN").to_f64("x").is_err());
        assert!(FieldValue::from("inf").to_f64("x").is_err());
    }

    #[test]
    fn test_record_from_json_object() {
        let record = RawRecord::from_json(json!({
            "age": 55,
            "sex_label": "Male",
            "fasting": false,
            "notes": null,
        }))
        .unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("age"), Some(&FieldValue::Number(55.0)));
        assert_eq!(record.get("sex_label").and_then(FieldValue::as_text), Some("Male"));
        assert_eq!(record.get("fasting"), Some(&FieldValue::Flag(false)));
        assert!(matches!(record.get("notes"), Some(FieldValue::Unsupported(_))));
    }

    #[test]
    fn test_record_from_non_object_is_rejected() {
        let err = RawRecord::from_json(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, FeatureError::MalformedRecord(_)));
    }
}
