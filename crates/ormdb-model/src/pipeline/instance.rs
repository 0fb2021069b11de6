//! Materialized model instances.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::{Row, Value};

/// A record loaded through the pipeline, with any associations hooks attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    model: String,
    id: Value,
    values: Row,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    associations: BTreeMap<String, Vec<Row>>,
}

impl Instance {
    /// Create an instance for a model row.
    pub fn new(model: impl Into<String>, id: Value, values: Row) -> Self {
        Self {
            model: model.into(),
            id,
            values,
            associations: BTreeMap::new(),
        }
    }

    /// Model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Primary key value.
    pub fn id(&self) -> &Value {
        &self.id
    }

    /// Field values, virtual fields included.
    pub fn values(&self) -> &Row {
        &self.values
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Set a field value on the instance only.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.set(field, value);
    }

    /// Rows attached under an association name.
    pub fn association(&self, name: &str) -> Option<&[Row]> {
        self.associations.get(name).map(Vec::as_slice)
    }

    /// Attach rows under an association name, replacing previous ones.
    pub fn set_association(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.associations.insert(name.into(), rows);
    }

    /// Names of attached associations.
    pub fn association_names(&self) -> impl Iterator<Item = &str> {
        self.associations.keys().map(String::as_str)
    }

    pub(crate) fn values_mut(&mut self) -> &mut Row {
        &mut self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associations() {
        let mut instance = Instance::new("product", Value::Int(1), Row::new().with("id", 1));
        assert!(instance.association("product_i18n").is_none());

        instance.set_association("product_i18n", vec![Row::new().with("name", "a")]);
        assert_eq!(instance.association("product_i18n").unwrap().len(), 1);
        assert_eq!(
            instance.association_names().collect::<Vec<_>>(),
            vec!["product_i18n"]
        );
    }

    #[test]
    fn test_serialize_shape() {
        let instance = Instance::new("product", Value::Int(1), Row::new().with("id", 1));
        let json = serde_json::to_value(&instance).unwrap();

        assert_eq!(json["model"], "product");
        assert_eq!(json["id"], 1);
        assert!(json.get("associations").is_none());
    }
}
