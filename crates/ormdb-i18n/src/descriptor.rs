//! Translation table descriptors.
//!
//! A descriptor is derived once per base model at definition time. It names the
//! shadow table and lists the columns it carries:
//!
//! | column        | type                                   |
//! |---------------|----------------------------------------|
//! | `id`          | int64, auto-increment identity         |
//! | `language_id` | int64 or string, from the language set |
//! | `parent_id`   | the base model's identity type         |
//! | translatable  | as declared on the base model, nullable |
//!
//! `(language_id, parent_id)` is unique.

use ormdb_model::{EntityDef, FieldDef, FieldType, Row, ScalarType, Value};

use crate::config::I18nConfig;
use crate::error::Error;
use crate::language::{Language, LanguageSet};
use crate::utils::translation_table_name_with_suffix;

/// Identity column of translation tables.
pub const ID_FIELD: &str = "id";

/// Language column of translation tables.
pub const LANGUAGE_FIELD: &str = "language_id";

/// Column referencing the base record.
pub const PARENT_FIELD: &str = "parent_id";

const RESERVED: [&str; 3] = [ID_FIELD, LANGUAGE_FIELD, PARENT_FIELD];

/// Shape of the translation table for one base model.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationDescriptor {
    base_model: String,
    table_name: String,
    language_type: ScalarType,
    parent_type: ScalarType,
    fields: Vec<FieldDef>,
}

impl TranslationDescriptor {
    /// Derive the descriptor for a base model.
    ///
    /// Returns `None` when the model declares no translatable fields.
    pub fn derive(
        base: &EntityDef,
        config: &I18nConfig,
        languages: &LanguageSet,
    ) -> Result<Option<Self>, Error> {
        if !base.has_translatable_fields() {
            return Ok(None);
        }

        let parent_type = base
            .get_identity_field()
            .map(FieldDef::scalar_type)
            .ok_or_else(|| {
                Error::Config(format!("{} has no identity field", base.name))
            })?;

        let mut fields = Vec::new();
        for field in base.translatable_fields() {
            if RESERVED.contains(&field.name.as_str()) {
                return Err(Error::ReservedField {
                    model: base.name.clone(),
                    field: field.name.clone(),
                });
            }
            fields.push(FieldDef {
                name: field.name.clone(),
                field_type: FieldType::OptionalScalar(field.scalar_type()),
                required: false,
                default: field.default.clone(),
                auto_increment: false,
                translatable: false,
                virtual_field: false,
            });
        }

        Ok(Some(Self {
            base_model: base.name.clone(),
            table_name: translation_table_name_with_suffix(&base.name, &config.suffix),
            language_type: languages.column_type(),
            parent_type,
            fields,
        }))
    }

    /// Name of the base model.
    pub fn base_model(&self) -> &str {
        &self.base_model
    }

    /// Name of the translation table, also the association name on instances.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Type of the `language_id` column.
    pub fn language_type(&self) -> ScalarType {
        self.language_type
    }

    /// Type of the `parent_id` column.
    pub fn parent_type(&self) -> ScalarType {
        self.parent_type
    }

    /// Translated column definitions.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Names of the translated columns.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Check if a base field is translated.
    pub fn is_translatable(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }

    /// Value stored in `language_id` for a language.
    pub fn language_value(&self, language: &Language) -> Value {
        language.column_value(self.language_type)
    }

    /// Filter selecting one language row of a record.
    pub fn row_filter(&self, parent: &Value, language: &Language) -> Row {
        Row::new()
            .with(PARENT_FIELD, parent.clone())
            .with(LANGUAGE_FIELD, self.language_value(language))
    }

    /// Filter selecting every language row of a record.
    pub fn parent_filter(&self, parent: &Value) -> Row {
        Row::new().with(PARENT_FIELD, parent.clone())
    }

    /// Definition of the translation table.
    pub fn to_entity_def(&self) -> EntityDef {
        EntityDef::new(&self.table_name, ID_FIELD)
            .with_field(FieldDef::scalar(ID_FIELD, ScalarType::Int64).auto_increment())
            .with_field(FieldDef::scalar(LANGUAGE_FIELD, self.language_type))
            .with_field(FieldDef::scalar(PARENT_FIELD, self.parent_type))
            .with_fields(self.fields.iter().cloned())
            .with_unique([LANGUAGE_FIELD, PARENT_FIELD])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> EntityDef {
        EntityDef::new("model", "id")
            .with_field(FieldDef::scalar("id", ScalarType::Int64))
            .with_field(FieldDef::scalar("name", ScalarType::String).translatable())
            .with_field(FieldDef::optional_scalar("description", ScalarType::Text).translatable())
            .with_field(FieldDef::scalar("reference", ScalarType::String))
    }

    fn derive(base: &EntityDef, config: &I18nConfig) -> Result<Option<TranslationDescriptor>, Error> {
        TranslationDescriptor::derive(base, config, &config.language_set().unwrap())
    }

    #[test]
    fn test_derive() {
        let config = I18nConfig::new(["FR", "EN", "ES"]);
        let descriptor = derive(&base(), &config).unwrap().unwrap();

        assert_eq!(descriptor.base_model(), "model");
        assert_eq!(descriptor.table_name(), "model_i18n");
        assert_eq!(descriptor.language_type(), ScalarType::String);
        assert_eq!(descriptor.parent_type(), ScalarType::Int64);
        assert_eq!(
            descriptor.field_names().collect::<Vec<_>>(),
            vec!["name", "description"]
        );
        assert!(descriptor.is_translatable("name"));
        assert!(!descriptor.is_translatable("reference"));
    }

    #[test]
    fn test_no_translatable_fields() {
        let plain = EntityDef::new("plain", "id")
            .with_field(FieldDef::scalar("id", ScalarType::Int64));
        let config = I18nConfig::new(["FR"]);
        assert!(derive(&plain, &config).unwrap().is_none());
    }

    #[test]
    fn test_entity_def_shape() {
        let config = I18nConfig::new([1i64, 2]).with_suffix("_tr");
        let def = derive(&base(), &config).unwrap().unwrap().to_entity_def();

        assert_eq!(def.name, "model_tr");
        assert_eq!(def.identity_field, "id");
        assert!(def.get_field("id").unwrap().auto_increment);
        assert_eq!(
            def.get_field("language_id").unwrap().scalar_type(),
            ScalarType::Int64
        );
        assert_eq!(
            def.get_field("parent_id").unwrap().scalar_type(),
            ScalarType::Int64
        );
        let name = def.get_field("name").unwrap();
        assert!(!name.required);
        assert!(!name.translatable);
        assert!(name.is_stored());
        assert_eq!(
            def.unique_groups,
            vec![vec!["language_id".to_string(), "parent_id".to_string()]]
        );
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_reserved_field() {
        let clashing = base()
            .with_field(FieldDef::optional_scalar("parent_id", ScalarType::String).translatable());
        let config = I18nConfig::new(["FR"]);
        assert!(matches!(
            derive(&clashing, &config),
            Err(Error::ReservedField { field, .. }) if field == "parent_id"
        ));
    }

    #[test]
    fn test_filters() {
        let config = I18nConfig::new(["FR", "EN"]);
        let descriptor = derive(&base(), &config).unwrap().unwrap();

        let filter = descriptor.row_filter(&Value::Int(1), &Language::from("EN"));
        assert_eq!(filter.get("parent_id"), Some(&Value::Int(1)));
        assert_eq!(filter.get("language_id"), Some(&Value::from("EN")));
        assert_eq!(descriptor.parent_filter(&Value::Int(1)).len(), 1);
    }
}
