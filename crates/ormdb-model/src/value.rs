//! Runtime values and rows.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::ScalarType;

/// A runtime field value.
///
/// Maps onto the scalar types defined in the catalog. Timestamps are carried as
/// `Int` microseconds.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[serde(untagged)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check whether this non-null value can be stored in a field of the given type.
    pub fn matches_type(&self, scalar: ScalarType) -> bool {
        match (self, scalar) {
            (Value::Null, _) => true,
            (Value::Bool(_), ScalarType::Bool) => true,
            (Value::Int(_), ScalarType::Int64 | ScalarType::Float64 | ScalarType::Timestamp) => {
                true
            }
            (Value::Float(_), ScalarType::Float64) => true,
            (Value::String(_), ScalarType::String | ScalarType::Text) => true,
            _ => false,
        }
    }

    /// Name of the value's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// An ordered map of field names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Remove a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Check if a field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite fields with those of `other`.
    pub fn merge(&mut self, other: &Row) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Split off the fields matching `pred` into a new row.
    pub fn extract(&mut self, mut pred: impl FnMut(&str) -> bool) -> Row {
        let keys: Vec<String> = self.0.keys().filter(|k| pred(k)).cloned().collect();
        let mut out = Row::new();
        for key in keys {
            if let Some(value) = self.0.remove(&key) {
                out.0.insert(key, value);
            }
        }
        out
    }

    /// Check that every field in `filter` has an equal value in this row.
    pub fn matches(&self, filter: &Row) -> bool {
        filter
            .iter()
            .all(|(k, v)| self.get(k).unwrap_or(&Value::Null) == v)
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_matching() {
        assert!(Value::Int(1).matches_type(ScalarType::Int64));
        assert!(Value::Int(1).matches_type(ScalarType::Float64));
        assert!(!Value::Float(1.5).matches_type(ScalarType::Int64));
        assert!(Value::from("x").matches_type(ScalarType::Text));
        assert!(!Value::from("x").matches_type(ScalarType::Bool));
        assert!(Value::Null.matches_type(ScalarType::Bool));
    }

    #[test]
    fn test_numeric() {
        assert!(Value::Int(2).is_numeric());
        assert!(Value::Float(2.0).is_numeric());
        assert!(!Value::from("2").is_numeric());
    }

    #[test]
    fn test_row_matches() {
        let row = Row::new().with("id", 1).with("name", "test");

        assert!(row.matches(&Row::new()));
        assert!(row.matches(&Row::new().with("id", 1)));
        assert!(!row.matches(&Row::new().with("id", 2)));
        assert!(row.matches(&Row::new().with("missing", Value::Null)));
    }

    #[test]
    fn test_row_extract() {
        let mut row = Row::new()
            .with("id", 1)
            .with("name", "test")
            .with("title", "t");

        let taken = row.extract(|f| f == "name" || f == "title");
        assert_eq!(taken.len(), 2);
        assert_eq!(row.len(), 1);
        assert!(row.contains("id"));
    }

    #[test]
    fn test_json_shape() {
        let row = Row::new()
            .with("id", 1)
            .with("name", "test")
            .with("note", Value::Null);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"test","note":null}"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }
}
