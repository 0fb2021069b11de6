//! Extension entry point.

use std::sync::Arc;

use ormdb_model::{CallOptions, Database, DefinePlugin, EntityDef, Instance, Row};
use tracing::info;

use crate::config::I18nConfig;
use crate::descriptor::{TranslationDescriptor, LANGUAGE_FIELD};
use crate::error::Error;
use crate::hooks::TranslationHooks;
use crate::language::{Language, LanguageSet};
use crate::registry::I18nRegistry;

/// The i18n extension.
///
/// Create it from a configuration, then call [`I18n::init`] on a database
/// before defining models with translatable fields.
#[derive(Clone)]
pub struct I18n {
    config: Arc<I18nConfig>,
    languages: Arc<LanguageSet>,
    registry: Arc<I18nRegistry>,
}

impl I18n {
    /// Create the extension, validating the configuration.
    pub fn new(config: I18nConfig) -> Result<Self, Error> {
        config.validate()?;
        let languages = config.language_set()?;

        Ok(Self {
            config: Arc::new(config),
            languages: Arc::new(languages),
            registry: Arc::new(I18nRegistry::new()),
        })
    }

    /// Install the extension on a database.
    ///
    /// Models defined afterwards get a translation table when they declare
    /// translatable fields.
    pub fn init(&self, db: &Database) {
        db.add_define_plugin(Arc::new(I18nDefinePlugin {
            config: Arc::clone(&self.config),
            languages: Arc::clone(&self.languages),
            registry: Arc::clone(&self.registry),
        }));
        info!(
            languages = self.languages.len(),
            default = %self.languages.default_language(),
            "i18n initialized"
        );
    }

    /// The configuration.
    pub fn config(&self) -> &I18nConfig {
        &self.config
    }

    /// Configured languages, in order.
    pub fn languages(&self) -> &[Language] {
        self.languages.languages()
    }

    /// The validated language set.
    pub fn language_set(&self) -> &LanguageSet {
        &self.languages
    }

    /// The default language.
    pub fn default_language(&self) -> &Language {
        self.languages.default_language()
    }

    /// The descriptor registry.
    pub fn registry(&self) -> &I18nRegistry {
        &self.registry
    }

    /// Descriptor for a base model.
    pub fn descriptor(&self, model: &str) -> Option<Arc<TranslationDescriptor>> {
        self.registry.get(model)
    }

    /// Call options selecting a language.
    pub fn options(&self, language: impl Into<Language>) -> CallOptions {
        CallOptions::new().with(
            self.config.language_option.clone(),
            language.into().to_value(),
        )
    }

    /// Translation rows attached to an instance.
    pub fn translations<'a>(&self, instance: &'a Instance) -> &'a [Row] {
        self.registry
            .get(instance.model())
            .and_then(|d| instance.association(d.table_name()))
            .unwrap_or(&[])
    }

    /// Translation row for a language, falling back to the default language.
    pub fn get_i18n<'a>(
        &self,
        instance: &'a Instance,
        language: impl Into<Language>,
    ) -> Option<&'a Row> {
        let descriptor = self.registry.get(instance.model())?;
        let rows = instance.association(descriptor.table_name())?;
        let find = move |lang: &Language| {
            let value = descriptor.language_value(lang);
            rows.iter().find(|r| r.get(LANGUAGE_FIELD) == Some(&value))
        };

        let language = language.into();
        find(&language).or_else(|| find(self.languages.default_language()))
    }
}

/// Define plugin wiring translation tables and hooks.
struct I18nDefinePlugin {
    config: Arc<I18nConfig>,
    languages: Arc<LanguageSet>,
    registry: Arc<I18nRegistry>,
}

impl DefinePlugin for I18nDefinePlugin {
    fn name(&self) -> &str {
        "i18n"
    }

    fn before_define(&self, def: &mut EntityDef) -> Result<(), ormdb_model::Error> {
        for field in def.fields.iter_mut().filter(|f| f.translatable) {
            field.virtual_field = true;
        }
        Ok(())
    }

    fn after_define(&self, db: &Database, def: &EntityDef) -> Result<(), ormdb_model::Error> {
        let descriptor = match TranslationDescriptor::derive(def, &self.config, &self.languages)? {
            Some(descriptor) => descriptor,
            None => return Ok(()),
        };

        db.define(descriptor.to_entity_def())?;
        let descriptor = self.registry.register(descriptor);
        db.add_hook(
            &def.name,
            Arc::new(TranslationHooks::new(
                Arc::clone(&descriptor),
                Arc::clone(&self.config),
                Arc::clone(&self.languages),
            )),
        )?;

        info!(
            model = %def.name,
            table = %descriptor.table_name(),
            fields = descriptor.fields().len(),
            "translation table defined"
        );
        Ok(())
    }
}
