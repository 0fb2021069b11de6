//! JSON schema files.
//!
//! ```json
//! {
//!   "i18n": { "languages": ["FR", "EN"], "default_language": "FR" },
//!   "models": [
//!     {
//!       "name": "product",
//!       "fields": [
//!         { "name": "id", "type": "int64", "auto_increment": true },
//!         { "name": "name", "type": "string", "translatable": true },
//!         { "name": "reference", "type": "string", "unique": true }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use ormdb_i18n::I18nConfig;
use ormdb_model::{DefaultValue, EntityDef, FieldDef, ScalarType, Value};
use serde::Deserialize;

use crate::error::CliError;

/// A schema file: extension configuration plus model definitions.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    /// Translation settings.
    pub i18n: I18nConfig,
    /// Models, defined in order.
    #[serde(default)]
    pub models: Vec<ModelSpec>,
}

/// One model.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    pub name: String,
    #[serde(default = "default_identity")]
    pub identity: String,
    pub fields: Vec<FieldSpec>,
    /// Composite unique constraints.
    #[serde(default)]
    pub unique: Vec<Vec<String>>,
}

/// One field of a model.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub scalar: ScalarType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: Option<Value>,
    /// Default to the insert time. Only valid on timestamp fields.
    #[serde(default)]
    pub default_now: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub translatable: bool,
    #[serde(default)]
    pub unique: bool,
}

fn default_identity() -> String {
    "id".to_string()
}

impl SchemaFile {
    /// Parse a schema from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CliError> {
        let schema: Self = serde_json::from_str(json)?;
        schema.i18n.validate()?;
        Ok(schema)
    }

    /// Load a schema file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = std::fs::read_to_string(path).map_err(|source| CliError::SchemaRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Model definitions in file order.
    pub fn entity_defs(&self) -> Result<Vec<EntityDef>, CliError> {
        self.models.iter().map(ModelSpec::to_entity_def).collect()
    }
}

impl ModelSpec {
    /// Convert to a model definition.
    pub fn to_entity_def(&self) -> Result<EntityDef, CliError> {
        let mut def = EntityDef::new(&self.name, &self.identity);

        for spec in &self.fields {
            def = def.with_field(spec.to_field_def(&self.name)?);
            if spec.unique {
                def = def.with_unique([spec.name.as_str()]);
            }
        }
        for group in &self.unique {
            def = def.with_unique(group.iter().map(String::as_str));
        }
        Ok(def)
    }
}

impl FieldSpec {
    fn to_field_def(&self, model: &str) -> Result<FieldDef, CliError> {
        let mut field = if self.optional {
            FieldDef::optional_scalar(&self.name, self.scalar)
        } else {
            FieldDef::scalar(&self.name, self.scalar)
        };

        match (&self.default, self.default_now) {
            (Some(_), true) => {
                return Err(CliError::Schema(format!(
                    "{}.{}: default and default_now are exclusive",
                    model, self.name
                )))
            }
            (Some(value), false) => field = field.with_default(default_value(value)),
            (None, true) if self.scalar == ScalarType::Timestamp => {
                field = field.with_default(DefaultValue::CurrentTimestamp)
            }
            (None, true) => {
                return Err(CliError::Schema(format!(
                    "{}.{}: default_now requires a timestamp field",
                    model, self.name
                )))
            }
            (None, false) => {}
        }

        if self.auto_increment {
            field = field.auto_increment();
        }
        if self.translatable {
            field = field.translatable();
        }
        Ok(field)
    }
}

fn default_value(value: &Value) -> DefaultValue {
    match value {
        Value::Null => DefaultValue::Null,
        Value::Bool(b) => DefaultValue::Bool(*b),
        Value::Int(i) => DefaultValue::Int(*i),
        Value::Float(f) => DefaultValue::Float(*f),
        Value::String(s) => DefaultValue::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use ormdb_i18n::Language;

    use super::*;

    const SCHEMA: &str = r#"{
        "i18n": { "languages": ["FR", "EN"], "default_language": "EN" },
        "models": [
            {
                "name": "product",
                "fields": [
                    { "name": "id", "type": "int64", "auto_increment": true },
                    { "name": "name", "type": "string", "translatable": true },
                    { "name": "stock", "type": "int64", "default": 0 },
                    { "name": "created", "type": "timestamp", "default_now": true },
                    { "name": "reference", "type": "string", "unique": true },
                    { "name": "note", "type": "text", "optional": true }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_schema() {
        let schema = SchemaFile::from_json_str(SCHEMA).unwrap();
        assert_eq!(schema.i18n.default_language, Some(Language::from("EN")));

        let defs = schema.entity_defs().unwrap();
        assert_eq!(defs.len(), 1);

        let product = &defs[0];
        assert_eq!(product.identity_field, "id");
        assert!(product.get_field("id").unwrap().auto_increment);
        assert!(product.get_field("name").unwrap().translatable);
        assert_eq!(
            product.get_field("stock").unwrap().default,
            Some(DefaultValue::Int(0))
        );
        assert_eq!(
            product.get_field("created").unwrap().default,
            Some(DefaultValue::CurrentTimestamp)
        );
        assert!(product.get_field("note").unwrap().field_type.is_nullable());
        assert_eq!(product.unique_groups, vec![vec!["reference".to_string()]]);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_default_now_needs_timestamp() {
        let json = r#"{
            "i18n": { "languages": "FR" },
            "models": [
                { "name": "m", "fields": [
                    { "name": "id", "type": "int64" },
                    { "name": "at", "type": "string", "default_now": true }
                ] }
            ]
        }"#;
        let schema = SchemaFile::from_json_str(json).unwrap();
        assert!(matches!(schema.entity_defs(), Err(CliError::Schema(_))));
    }

    #[test]
    fn test_invalid_i18n_section() {
        let json = r#"{ "i18n": { "languages": [] }, "models": [] }"#;
        assert!(matches!(
            SchemaFile::from_json_str(json),
            Err(CliError::I18n(ormdb_i18n::Error::Config(_)))
        ));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let json = r#"{ "i18n": { "languages": "FR" }, "tables": [] }"#;
        assert!(matches!(
            SchemaFile::from_json_str(json),
            Err(CliError::SchemaParse(_))
        ));
    }
}
