//! Entity definitions.

use super::field::FieldDef;
use crate::error::Error;

/// An entity definition (table schema).
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef {
    /// Entity name (unique within the database).
    pub name: String,
    /// Name of the primary identity field.
    pub identity_field: String,
    /// Field definitions.
    pub fields: Vec<FieldDef>,
    /// Groups of fields whose combined values must be unique.
    pub unique_groups: Vec<Vec<String>>,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>, identity_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity_field: identity_field.into(),
            fields: Vec::new(),
            unique_groups: Vec::new(),
        }
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Add a unique group.
    pub fn with_unique<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.unique_groups
            .push(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a mutable field by name.
    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut FieldDef> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Get the identity field definition.
    pub fn get_identity_field(&self) -> Option<&FieldDef> {
        self.get_field(&self.identity_field)
    }

    /// Fields persisted in the model's table.
    pub fn stored_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_stored())
    }

    /// Fields declared translatable.
    pub fn translatable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.translatable)
    }

    /// Check if this entity declares translatable fields.
    pub fn has_translatable_fields(&self) -> bool {
        self.fields.iter().any(|f| f.translatable)
    }

    /// Check structural consistency.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| Error::InvalidDefinition {
            model: self.name.clone(),
            message,
        };

        if self.name.is_empty() {
            return Err(invalid("empty model name".into()));
        }

        let identity = self
            .get_identity_field()
            .ok_or_else(|| invalid(format!("identity field {} not declared", self.identity_field)))?;
        if !identity.scalar_type().is_key_type() {
            return Err(invalid(format!(
                "identity field {} must be int64 or string",
                identity.name
            )));
        }
        if identity.translatable || identity.virtual_field {
            return Err(invalid("identity field must be stored".into()));
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(invalid(format!("duplicate field {}", field.name)));
            }
            if field.auto_increment && field.scalar_type() != super::ScalarType::Int64 {
                return Err(invalid(format!(
                    "auto-increment field {} must be int64",
                    field.name
                )));
            }
        }

        for group in &self.unique_groups {
            for name in group {
                match self.get_field(name) {
                    Some(f) if f.is_stored() => {}
                    _ => return Err(invalid(format!("unique group references {}", name))),
                }
            }
        }

        Ok(())
    }
}
