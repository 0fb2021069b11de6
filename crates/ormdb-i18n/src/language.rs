//! Language codes and the configured language set.

use std::fmt;

use ormdb_model::{ScalarType, Value};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::utils::language_column_type;

/// A language code: textual (`"FR"`) or numeric (`1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Language {
    /// Numeric language id.
    Id(i64),
    /// Textual language code.
    Code(String),
}

impl Language {
    /// The code as a model value.
    pub fn to_value(&self) -> Value {
        match self {
            Language::Id(id) => Value::Int(*id),
            Language::Code(code) => Value::String(code.clone()),
        }
    }

    /// The code as stored in a column of the given type.
    ///
    /// Numeric ids land in text columns as their decimal form.
    pub fn column_value(&self, column: ScalarType) -> Value {
        match (self, column) {
            (Language::Id(id), ScalarType::Int64) => Value::Int(*id),
            _ => Value::String(self.to_string()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Id(id) => write!(f, "{}", id),
            Language::Code(code) => f.write_str(code),
        }
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Language::Code(code.to_string())
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Language::Code(code)
    }
}

impl From<i64> for Language {
    fn from(id: i64) -> Self {
        Language::Id(id)
    }
}

/// The validated, ordered list of languages with its default.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSet {
    languages: Vec<Language>,
    default: Language,
    column_type: ScalarType,
}

impl LanguageSet {
    /// Build a set, checking that it is non-empty, duplicate-free and holds the default.
    ///
    /// Without an explicit default the first language is used.
    pub fn new(languages: Vec<Language>, default: Option<Language>) -> Result<Self, Error> {
        let first = languages
            .first()
            .cloned()
            .ok_or_else(|| Error::Config("at least one language is required".into()))?;

        let values: Vec<Value> = languages.iter().map(Language::to_value).collect();
        let column_type = language_column_type(&values);

        // Languages are told apart by what lands in the language column.
        let stored: Vec<Value> = languages
            .iter()
            .map(|l| l.column_value(column_type))
            .collect();
        for (i, value) in stored.iter().enumerate() {
            if stored[..i].contains(value) {
                return Err(Error::Config(format!(
                    "duplicate language {}",
                    languages[i]
                )));
            }
        }

        let default = default.unwrap_or(first);
        if !languages.contains(&default) {
            return Err(Error::Config(format!(
                "default language {} is not in the language list",
                default
            )));
        }

        Ok(Self {
            languages,
            default,
            column_type,
        })
    }

    /// Languages in configured order.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// The default language.
    pub fn default_language(&self) -> &Language {
        &self.default
    }

    /// Column type of the translation tables' language column.
    pub fn column_type(&self) -> ScalarType {
        self.column_type
    }

    /// Number of languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// Check membership.
    pub fn contains(&self, language: &Language) -> bool {
        self.languages.contains(language)
    }

    /// Position of a language in the configured order.
    pub fn position(&self, language: &Language) -> Option<usize> {
        self.languages.iter().position(|l| l == language)
    }

    /// Find the configured language a caller-supplied value refers to.
    ///
    /// Matches exactly first, then by textual form so `"2"` finds `2`.
    pub fn resolve(&self, value: &Value) -> Option<&Language> {
        self.languages
            .iter()
            .find(|l| &l.to_value() == value)
            .or_else(|| {
                let text = value.to_string();
                self.languages.iter().find(|l| l.to_string() == text)
            })
    }

    /// Parse a language typed on a command line.
    ///
    /// `"2"` names the numeric language `2` only when one is configured.
    pub fn parse(&self, text: &str) -> Result<&Language, Error> {
        self.resolve(&Value::from(text))
            .ok_or_else(|| Error::UnknownLanguage(text.to_string()))
    }

    /// Find the configured language a stored language column value refers to.
    pub fn from_column(&self, value: &Value) -> Option<&Language> {
        self.languages
            .iter()
            .find(|l| &l.column_value(self.column_type) == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<Language> {
        list.iter().map(|c| Language::from(*c)).collect()
    }

    #[test]
    fn test_default_falls_back_to_first() {
        let set = LanguageSet::new(codes(&["FR", "EN", "ES"]), None).unwrap();
        assert_eq!(set.default_language(), &Language::from("FR"));
        assert_eq!(set.len(), 3);
        assert_eq!(set.column_type(), ScalarType::String);
    }

    #[test]
    fn test_explicit_default() {
        let set = LanguageSet::new(codes(&["FR", "EN"]), Some("EN".into())).unwrap();
        assert_eq!(set.default_language(), &Language::from("EN"));
    }

    #[test]
    fn test_rejects_bad_sets() {
        assert!(matches!(
            LanguageSet::new(Vec::new(), None),
            Err(Error::Config(_))
        ));
        assert!(LanguageSet::new(codes(&["FR", "FR"]), None).is_err());
        assert!(LanguageSet::new(codes(&["FR", "EN"]), Some("DE".into())).is_err());
    }

    #[test]
    fn test_rejects_colliding_column_values() {
        let err = LanguageSet::new(vec![Language::from("2"), Language::Id(2)], None).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg == "duplicate language 2"));

        let set = LanguageSet::new(vec![Language::from("3"), Language::Id(2)], None).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_numeric_languages() {
        let set = LanguageSet::new(vec![Language::Id(1), Language::Id(2)], None).unwrap();
        assert_eq!(set.column_type(), ScalarType::Int64);
        assert_eq!(set.resolve(&Value::Int(2)), Some(&Language::Id(2)));
        assert_eq!(set.resolve(&Value::from("2")), Some(&Language::Id(2)));
        assert_eq!(set.resolve(&Value::Int(3)), None);
    }

    #[test]
    fn test_parse() {
        let numeric = LanguageSet::new(vec![Language::Id(1), Language::Id(2)], None).unwrap();
        assert_eq!(numeric.parse("2").unwrap(), &Language::Id(2));

        let text = LanguageSet::new(codes(&["FR", "10"]), None).unwrap();
        assert_eq!(text.parse("10").unwrap(), &Language::from("10"));
        assert!(matches!(text.parse("DE"), Err(Error::UnknownLanguage(code)) if code == "DE"));
    }

    #[test]
    fn test_mixed_languages_use_text_column() {
        let set = LanguageSet::new(vec![Language::from("FR"), Language::Id(2)], None).unwrap();
        assert_eq!(set.column_type(), ScalarType::String);
        assert_eq!(
            Language::Id(2).column_value(set.column_type()),
            Value::from("2")
        );
        assert_eq!(set.from_column(&Value::from("2")), Some(&Language::Id(2)));
    }

    #[test]
    fn test_language_from_json() {
        let langs: Vec<Language> = serde_json::from_str(r#"["FR", 2]"#).unwrap();
        assert_eq!(langs, vec![Language::from("FR"), Language::Id(2)]);
    }
}
