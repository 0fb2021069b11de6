//! CLI errors.

use thiserror::Error;

/// Errors surfaced by the command-line tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// Schema file could not be read.
    #[error("cannot read schema {path}: {source}")]
    SchemaRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Schema file is not valid JSON for the expected shape.
    #[error("invalid schema: {0}")]
    SchemaParse(#[from] serde_json::Error),

    /// Schema content is inconsistent.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// A `--set` argument is not `field=value`.
    #[error("invalid assignment '{0}', expected field=value")]
    Assignment(String),

    /// A record id that does not fit the model's identity type.
    #[error("invalid {model} id '{id}'")]
    InvalidId { model: String, id: String },

    /// Record lookup failed.
    #[error("{model} {id} not found")]
    NotFound { model: String, id: String },

    /// Translation layer error.
    #[error(transparent)]
    I18n(#[from] ormdb_i18n::Error),

    /// Persistence error.
    #[error("{}", describe_model_error(.0))]
    Model(ormdb_model::Error),
}

impl From<ormdb_model::Error> for CliError {
    fn from(err: ormdb_model::Error) -> Self {
        CliError::Model(err)
    }
}

/// Render model errors, unwrapping i18n errors carried through hooks.
fn describe_model_error(err: &ormdb_model::Error) -> String {
    match ormdb_i18n::Error::from_model(err) {
        Some(inner) => inner.to_string(),
        None => err.to_string(),
    }
}
