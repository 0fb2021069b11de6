//! Lifecycle hooks keeping a translation table in step with its base model.

use std::sync::Arc;

use ormdb_model::{CallOptions, Database, Instance, ModelHook, Row, Value};
use tracing::debug;

use crate::config::{I18nConfig, SeedPolicy};
use crate::descriptor::{TranslationDescriptor, LANGUAGE_FIELD, PARENT_FIELD};
use crate::error::Error;
use crate::language::{Language, LanguageSet};

/// Hooks attached to one base model.
pub struct TranslationHooks {
    descriptor: Arc<TranslationDescriptor>,
    config: Arc<I18nConfig>,
    languages: Arc<LanguageSet>,
}

impl TranslationHooks {
    /// Create hooks for a descriptor.
    pub fn new(
        descriptor: Arc<TranslationDescriptor>,
        config: Arc<I18nConfig>,
        languages: Arc<LanguageSet>,
    ) -> Self {
        Self {
            descriptor,
            config,
            languages,
        }
    }

    /// Language named in the call options, if any.
    fn requested_language(&self, options: &CallOptions) -> Result<Option<Language>, Error> {
        match options.get(&self.config.language_option) {
            None => Ok(None),
            Some(value) => self
                .languages
                .resolve(value)
                .cloned()
                .map(Some)
                .ok_or_else(|| Error::UnknownLanguage(value.to_string())),
        }
    }

    fn target_language(&self, options: &CallOptions) -> Result<Language, Error> {
        Ok(self
            .requested_language(options)?
            .unwrap_or_else(|| self.languages.default_language().clone()))
    }

    /// Translation rows of a record in configured language order.
    fn load(&self, db: &Database, parent: &Value) -> Result<Vec<Row>, Error> {
        let mut rows = db.select_rows(
            self.descriptor.table_name(),
            &self.descriptor.parent_filter(parent),
        )?;
        rows.sort_by_key(|row| {
            row.get(LANGUAGE_FIELD)
                .and_then(|v| self.languages.from_column(v))
                .and_then(|l| self.languages.position(l))
                .unwrap_or(usize::MAX)
        });
        Ok(rows)
    }

    /// Pick the row for `language`, falling back to the default language.
    fn pick<'a>(&self, rows: &'a [Row], language: &Language) -> Option<&'a Row> {
        let find = move |lang: &Language| {
            let value = self.descriptor.language_value(lang);
            rows.iter().find(|r| r.get(LANGUAGE_FIELD) == Some(&value))
        };
        find(language).or_else(|| find(self.languages.default_language()))
    }

    /// Copy translated values from `row` onto the instance.
    fn project(&self, instance: &mut Instance, row: Option<&Row>) {
        for field in self.descriptor.field_names() {
            let value = row
                .and_then(|r| r.get(field))
                .cloned()
                .unwrap_or(Value::Null);
            instance.set(field, value);
        }
    }

    fn seed(
        &self,
        db: &Database,
        instance: &mut Instance,
        options: &CallOptions,
    ) -> Result<(), Error> {
        let requested = self.target_language(options)?;
        let targets = match self.config.seed {
            SeedPolicy::AllLanguages => self.languages.languages().to_vec(),
            SeedPolicy::DefaultOnly => vec![requested],
        };

        let values: Row = self
            .descriptor
            .field_names()
            .map(|f| {
                let value = instance.get(f).cloned().unwrap_or(Value::Null);
                (f.to_string(), value)
            })
            .collect();

        let mut rows = Vec::with_capacity(targets.len());
        for language in &targets {
            let row = values
                .clone()
                .with(LANGUAGE_FIELD, self.descriptor.language_value(language))
                .with(PARENT_FIELD, instance.id().clone());
            rows.push(db.insert_row(self.descriptor.table_name(), row)?);
        }
        debug!(
            model = %self.descriptor.base_model(),
            id = %instance.id(),
            rows = rows.len(),
            "translations seeded"
        );

        instance.set_association(self.descriptor.table_name(), rows);
        Ok(())
    }

    fn attach(
        &self,
        db: &Database,
        instance: &mut Instance,
        options: &CallOptions,
    ) -> Result<(), Error> {
        let language = self.target_language(options)?;
        let rows = self.load(db, instance.id())?;
        let chosen = self.pick(&rows, &language).cloned();
        self.project(instance, chosen.as_ref());
        instance.set_association(self.descriptor.table_name(), rows);
        Ok(())
    }

    fn route_update(
        &self,
        db: &Database,
        instance: &mut Instance,
        changes: &mut Row,
        options: &CallOptions,
    ) -> Result<(), Error> {
        let language = self.target_language(options)?;
        let translated = changes.extract(|f| self.descriptor.is_translatable(f));
        if translated.is_empty() {
            return Ok(());
        }

        let table = self.descriptor.table_name();
        let filter = self.descriptor.row_filter(instance.id(), &language);

        let mut written = db.update_rows(table, &filter, &translated)?;
        if written == 0 {
            let mut row = translated.clone();
            row.merge(&filter);
            match db.insert_row(table, row) {
                Ok(_) => {}
                // Another writer created the row first.
                Err(ormdb_model::Error::UniqueViolation { .. }) => {
                    written = db.update_rows(table, &filter, &translated)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        debug!(
            model = %self.descriptor.base_model(),
            id = %instance.id(),
            language = %language,
            inserted = written == 0,
            "translation written"
        );

        for (field, value) in translated.iter() {
            instance.set(field.clone(), value.clone());
        }
        let rows = self.load(db, instance.id())?;
        instance.set_association(table, rows);
        Ok(())
    }
}

impl ModelHook for TranslationHooks {
    fn name(&self) -> &str {
        "i18n"
    }

    fn validate_options(
        &self,
        _db: &Database,
        options: &CallOptions,
    ) -> Result<(), ormdb_model::Error> {
        self.requested_language(options)?;
        Ok(())
    }

    fn after_create(
        &self,
        db: &Database,
        instance: &mut Instance,
        options: &CallOptions,
    ) -> Result<(), ormdb_model::Error> {
        Ok(self.seed(db, instance, options)?)
    }

    fn after_find(
        &self,
        db: &Database,
        instance: &mut Instance,
        options: &CallOptions,
    ) -> Result<(), ormdb_model::Error> {
        self.requested_language(options)?;
        if !self.config.attach_on_find {
            return Ok(());
        }
        Ok(self.attach(db, instance, options)?)
    }

    fn before_update(
        &self,
        db: &Database,
        instance: &mut Instance,
        changes: &mut Row,
        options: &CallOptions,
    ) -> Result<(), ormdb_model::Error> {
        Ok(self.route_update(db, instance, changes, options)?)
    }

    fn after_destroy(
        &self,
        db: &Database,
        instance: &Instance,
        options: &CallOptions,
    ) -> Result<(), ormdb_model::Error> {
        self.requested_language(options)?;
        let removed = db.delete_rows(
            self.descriptor.table_name(),
            &self.descriptor.parent_filter(instance.id()),
        )?;
        debug!(
            model = %self.descriptor.base_model(),
            id = %instance.id(),
            removed,
            "translations removed"
        );
        Ok(())
    }
}
