//! Extension error types.

use thiserror::Error;

/// i18n extension errors.
///
/// Failures of the underlying model layer are carried unchanged in
/// [`Error::Model`].
#[derive(Debug, Error)]
pub enum Error {
    /// Model layer error, passed through as is.
    #[error(transparent)]
    Model(#[from] ormdb_model::Error),

    /// Invalid extension configuration.
    #[error("invalid i18n configuration: {0}")]
    Config(String),

    /// Configuration could not be parsed.
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A language code outside the configured list.
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    /// A translatable field collides with a translation table column.
    #[error("field {field} on {model} clashes with a translation table column")]
    ReservedField {
        /// Base model name.
        model: String,
        /// Field name.
        field: String,
    },
}

impl Error {
    /// Recover an extension error raised inside the model pipeline.
    pub fn from_model(err: &ormdb_model::Error) -> Option<&Error> {
        match err {
            ormdb_model::Error::Plugin(inner) => inner.downcast_ref::<Error>(),
            _ => None,
        }
    }
}

impl From<Error> for ormdb_model::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Model(inner) => inner,
            other => ormdb_model::Error::plugin(other),
        }
    }
}

/// Result alias for extension operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_pass_through() {
        let err: ormdb_model::Error = Error::Model(ormdb_model::Error::NotFound("x".into())).into();
        assert!(matches!(err, ormdb_model::Error::NotFound(_)));
        assert!(Error::from_model(&err).is_none());
    }

    #[test]
    fn test_extension_errors_wrap_and_recover() {
        let err: ormdb_model::Error = Error::UnknownLanguage("DE".into()).into();
        assert!(matches!(err, ormdb_model::Error::Plugin(_)));
        assert!(matches!(
            Error::from_model(&err),
            Some(Error::UnknownLanguage(code)) if code == "DE"
        ));
    }
}
