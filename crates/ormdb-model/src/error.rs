//! Model layer error types.

use thiserror::Error;

/// Boxed error raised by an installed plugin or hook.
pub type PluginError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Model layer errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key encoding or decoding error.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The model has not been defined.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A model with this name is already defined.
    #[error("model already defined: {0}")]
    DuplicateModel(String),

    /// Invalid model definition.
    #[error("invalid definition for {model}: {message}")]
    InvalidDefinition {
        /// Model name.
        model: String,
        /// What is wrong with it.
        message: String,
    },

    /// A write referenced a field the model does not declare.
    #[error("unknown field {field} on {model}")]
    UnknownField {
        /// Model name.
        model: String,
        /// Field name.
        field: String,
    },

    /// A required field has no value and no default.
    #[error("missing required field {field} on {model}")]
    MissingField {
        /// Model name.
        model: String,
        /// Field name.
        field: String,
    },

    /// A value does not match the declared field type.
    #[error("type mismatch for {model}.{field}: expected {expected}")]
    TypeMismatch {
        /// Model name.
        model: String,
        /// Field name.
        field: String,
        /// Expected scalar type.
        expected: String,
    },

    /// A unique field group already holds these values.
    #[error("unique violation on {model}({})", fields.join(", "))]
    UniqueViolation {
        /// Model name.
        model: String,
        /// Fields of the violated unique group.
        fields: Vec<String>,
    },

    /// Record not found.
    #[error("record not found in {0}")]
    NotFound(String),

    /// Error raised by a plugin or lifecycle hook.
    #[error("plugin error: {0}")]
    Plugin(#[source] PluginError),

    /// Background task failure (async facade).
    #[error("task error: {0}")]
    Task(String),
}

impl Error {
    /// Wrap a plugin error.
    pub fn plugin(err: impl Into<PluginError>) -> Self {
        Error::Plugin(err.into())
    }
}

/// Result alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;
