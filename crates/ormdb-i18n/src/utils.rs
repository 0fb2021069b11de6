//! Naming and type helpers.

use ormdb_model::{ScalarType, Value};
use serde::{Deserialize, Serialize};

/// Suffix appended to a base model name to name its translation table.
pub const DEFAULT_SUFFIX: &str = "_i18n";

/// Name of the translation table for a model.
pub fn translation_table_name(model: &str) -> String {
    translation_table_name_with_suffix(model, DEFAULT_SUFFIX)
}

/// Name of the translation table for a model, with a custom suffix.
pub fn translation_table_name_with_suffix(model: &str, suffix: &str) -> String {
    format!("{}{}", model, suffix)
}

/// A single value or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A lone scalar.
    One(T),
    /// A sequence.
    Many(Vec<T>),
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        OneOrMany::Many(values)
    }
}

/// Normalize optional input to a sequence.
///
/// Absent input gives an empty sequence, a scalar a singleton, and a sequence
/// is returned unchanged.
pub fn to_sequence<T>(value: Option<OneOrMany<T>>) -> Vec<T> {
    match value {
        None => Vec::new(),
        Some(OneOrMany::One(v)) => vec![v],
        Some(OneOrMany::Many(vs)) => vs,
    }
}

/// Column type able to hold every value of a language list.
///
/// Integer when every element is numeric, text otherwise. Empty input is text.
pub fn language_column_type(values: &[Value]) -> ScalarType {
    if values.is_empty() {
        return ScalarType::String;
    }
    if values.iter().all(Value::is_numeric) {
        ScalarType::Int64
    } else {
        ScalarType::String
    }
}
