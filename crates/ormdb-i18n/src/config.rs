//! Extension configuration.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;
use crate::language::{Language, LanguageSet};
use crate::utils::{to_sequence, OneOrMany, DEFAULT_SUFFIX};

/// Default call-option key carrying the language code.
pub const DEFAULT_LANGUAGE_OPTION: &str = "language_id";

/// Which translation rows are written when a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// One row per configured language, each holding the supplied values.
    #[default]
    AllLanguages,
    /// A single row for the requested (or default) language.
    DefaultOnly,
}

/// i18n extension configuration.
///
/// Deserializes from JSON; `languages` accepts a single code or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct I18nConfig {
    /// Configured languages, in order.
    #[serde(default, deserialize_with = "deserialize_languages")]
    pub languages: Vec<Language>,

    /// Default language. The first language when absent.
    #[serde(default)]
    pub default_language: Option<Language>,

    /// Suffix naming translation tables.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Rows written on create.
    #[serde(default)]
    pub seed: SeedPolicy,

    /// Attach translations to instances on find.
    #[serde(default = "default_true")]
    pub attach_on_find: bool,

    /// Call-option key carrying the language code.
    #[serde(default = "default_language_option")]
    pub language_option: String,
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

fn default_true() -> bool {
    true
}

fn default_language_option() -> String {
    DEFAULT_LANGUAGE_OPTION.to_string()
}

fn deserialize_languages<'de, D>(deserializer: D) -> Result<Vec<Language>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<OneOrMany<Language>>::deserialize(deserializer)?;
    Ok(to_sequence(raw))
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            default_language: None,
            suffix: default_suffix(),
            seed: SeedPolicy::default(),
            attach_on_find: true,
            language_option: default_language_option(),
        }
    }
}

impl I18nConfig {
    /// Create a configuration for the given languages.
    pub fn new<L: Into<Language>>(languages: impl IntoIterator<Item = L>) -> Self {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the default language.
    pub fn with_default_language(mut self, language: impl Into<Language>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Set the translation table suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the seed policy.
    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable attaching translations on find.
    pub fn with_attach_on_find(mut self, attach: bool) -> Self {
        self.attach_on_find = attach;
        self
    }

    /// Set the call-option key carrying the language code.
    pub fn with_language_option(mut self, key: impl Into<String>) -> Self {
        self.language_option = key.into();
        self
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Build the validated language set.
    pub fn language_set(&self) -> Result<LanguageSet, Error> {
        LanguageSet::new(self.languages.clone(), self.default_language.clone())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        self.language_set()?;
        if self.suffix.is_empty() {
            return Err(Error::Config("suffix must not be empty".into()));
        }
        if self.language_option.is_empty() {
            return Err(Error::Config("language option key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = I18nConfig::new(["FR", "EN", "ES"])
            .with_default_language("EN")
            .with_seed(SeedPolicy::DefaultOnly);

        assert_eq!(config.languages.len(), 3);
        assert_eq!(config.default_language, Some(Language::from("EN")));
        assert_eq!(config.suffix, "_i18n");
        assert!(config.attach_on_find);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_defaults() {
        let config = I18nConfig::from_json_str(r#"{"languages": ["FR", "EN"]}"#).unwrap();

        assert_eq!(config.languages, vec![Language::from("FR"), Language::from("EN")]);
        assert_eq!(config.default_language, None);
        assert_eq!(config.seed, SeedPolicy::AllLanguages);
        assert_eq!(config.language_option, "language_id");
        assert_eq!(
            config.language_set().unwrap().default_language(),
            &Language::from("FR")
        );
    }

    #[test]
    fn test_from_json_single_language() {
        let config = I18nConfig::from_json_str(
            r#"{"languages": "FR", "seed": "default_only", "suffix": "_tr"}"#,
        )
        .unwrap();

        assert_eq!(config.languages, vec![Language::from("FR")]);
        assert_eq!(config.seed, SeedPolicy::DefaultOnly);
        assert_eq!(config.suffix, "_tr");
    }

    #[test]
    fn test_from_json_numeric_languages() {
        let config =
            I18nConfig::from_json_str(r#"{"languages": [1, 2], "default_language": 2}"#).unwrap();
        assert_eq!(config.default_language, Some(Language::Id(2)));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            I18nConfig::from_json_str(r#"{}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            I18nConfig::from_json_str(r#"{"languages": ["FR"], "default_language": "EN"}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            I18nConfig::from_json_str(r#"{"languages": ["FR"], "colour": 1}"#),
            Err(Error::Parse(_))
        ));
        assert!(I18nConfig::new(["FR"]).with_suffix("").validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i18n.json");
        std::fs::write(&path, r#"{"languages": ["FR", "EN"]}"#).unwrap();

        let config = I18nConfig::from_file(&path).unwrap();
        assert_eq!(config.languages.len(), 2);

        assert!(I18nConfig::from_file(&dir.path().join("missing.json")).is_err());
    }
}
