//! Field definitions for models.

use super::types::{FieldType, ScalarType};
use crate::storage::current_timestamp;
use crate::value::Value;

/// A field definition within a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Whether the field is required (non-nullable at the application level).
    pub required: bool,
    /// Default value if not provided.
    pub default: Option<DefaultValue>,
    /// Whether values come from a sequence when not provided.
    pub auto_increment: bool,
    /// Whether the field holds per-language values.
    pub translatable: bool,
    /// Virtual fields live on instances only and are never stored.
    pub virtual_field: bool,
}

/// Default value for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Current timestamp (evaluated at insert time).
    CurrentTimestamp,
}

impl DefaultValue {
    /// Produce the value to store.
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(*b),
            DefaultValue::Int(i) => Value::Int(*i),
            DefaultValue::Float(f) => Value::Float(*f),
            DefaultValue::String(s) => Value::String(s.clone()),
            DefaultValue::CurrentTimestamp => Value::Int(current_timestamp() as i64),
        }
    }
}

impl FieldDef {
    /// Create a new required field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            default: None,
            auto_increment: false,
            translatable: false,
            virtual_field: false,
        }
    }

    /// Create an optional field (required = false, nullable type).
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::new(name, field_type.to_optional())
        }
    }

    /// Create a required scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar))
    }

    /// Create an optional scalar field.
    pub fn optional_scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::optional(name, FieldType::Scalar(scalar))
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Fill from the model's sequence when no value is given.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark as translatable.
    pub fn translatable(mut self) -> Self {
        self.translatable = true;
        self
    }

    /// Mark as virtual.
    pub fn virtual_field(mut self) -> Self {
        self.virtual_field = true;
        self
    }

    /// The field's scalar type.
    pub fn scalar_type(&self) -> ScalarType {
        self.field_type.scalar_type()
    }

    /// Check if this field has a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Check if this field is persisted.
    pub fn is_stored(&self) -> bool {
        !self.virtual_field
    }

    /// Check whether a value is acceptable for this field.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.field_type.is_nullable() || !self.required;
        }
        value.matches_type(self.scalar_type())
    }
}
