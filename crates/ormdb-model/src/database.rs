//! Database facade combining the catalog, the storage engine and the hook pipeline.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::catalog::EntityDef;
use crate::error::Error;
use crate::pipeline::{CallOptions, DefinePlugin, Instance, ModelHook};
use crate::storage::{Record, StorageConfig, StorageEngine};
use crate::value::{Row, Value};

/// An embedded database of defined models.
///
/// All methods take `&self`; the database can be shared behind an `Arc`.
pub struct Database {
    storage: StorageEngine,
    models: RwLock<BTreeMap<String, Arc<EntityDef>>>,
    hooks: RwLock<BTreeMap<String, Vec<Arc<dyn ModelHook>>>>,
    plugins: RwLock<Vec<Arc<dyn DefinePlugin>>>,
    /// Serializes unique checks with the write that follows them, per model.
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Database {
    /// Open a database with the given storage configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let storage = StorageEngine::open(config)?;
        if storage.was_recovered() {
            info!("recovered existing storage");
        }

        Ok(Self {
            storage,
            models: RwLock::new(BTreeMap::new()),
            hooks: RwLock::new(BTreeMap::new()),
            plugins: RwLock::new(Vec::new()),
            write_locks: DashMap::new(),
        })
    }

    /// Open a database at the given path.
    pub fn open_path(path: &Path) -> Result<Self, Error> {
        Self::open(StorageConfig::new(path))
    }

    /// Open a temporary database, removed on drop.
    pub fn temporary() -> Result<Self, Error> {
        Self::open(StorageConfig::temporary())
    }

    /// Access the storage engine.
    pub fn storage(&self) -> &StorageEngine {
        &self.storage
    }

    // ========== Definitions ==========

    /// Install a plugin consulted on every later definition.
    pub fn add_define_plugin(&self, plugin: Arc<dyn DefinePlugin>) {
        info!(plugin = plugin.name(), "define plugin installed");
        self.plugins.write().push(plugin);
    }

    /// Define a model.
    ///
    /// Define plugins may rewrite the definition first and react to it after
    /// it is registered. If any plugin fails afterwards, the definition and its
    /// hooks are withdrawn again.
    pub fn define(&self, mut def: EntityDef) -> Result<Arc<EntityDef>, Error> {
        let plugins: Vec<_> = self.plugins.read().iter().cloned().collect();

        for plugin in &plugins {
            plugin.before_define(&mut def)?;
        }
        def.validate()?;

        let def = Arc::new(def);
        {
            let mut models = self.models.write();
            if models.contains_key(&def.name) {
                return Err(Error::DuplicateModel(def.name.clone()));
            }
            models.insert(def.name.clone(), Arc::clone(&def));
        }
        info!(
            model = %def.name,
            fields = def.fields.len(),
            "model defined"
        );

        for plugin in &plugins {
            if let Err(e) = plugin.after_define(self, &def) {
                warn!(model = %def.name, plugin = plugin.name(), error = %e, "definition withdrawn");
                self.models.write().remove(&def.name);
                self.hooks.write().remove(&def.name);
                return Err(e);
            }
        }

        Ok(def)
    }

    /// Get a model definition.
    pub fn model(&self, name: &str) -> Result<Arc<EntityDef>, Error> {
        self.models
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownModel(name.to_string()))
    }

    /// Check if a model is defined.
    pub fn has_model(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    /// Names of all defined models, sorted.
    pub fn model_names(&self) -> Vec<String> {
        self.models.read().keys().cloned().collect()
    }

    /// Attach a lifecycle hook to a model.
    pub fn add_hook(&self, model: &str, hook: Arc<dyn ModelHook>) -> Result<(), Error> {
        if !self.has_model(model) {
            return Err(Error::UnknownModel(model.to_string()));
        }
        debug!(model, hook = hook.name(), "hook attached");
        self.hooks
            .write()
            .entry(model.to_string())
            .or_default()
            .push(hook);
        Ok(())
    }

    fn hooks_for(&self, model: &str) -> Vec<Arc<dyn ModelHook>> {
        self.hooks
            .read()
            .get(model)
            .map(|hooks| hooks.to_vec())
            .unwrap_or_default()
    }

    fn validate_options(
        &self,
        hooks: &[Arc<dyn ModelHook>],
        options: &CallOptions,
    ) -> Result<(), Error> {
        for hook in hooks {
            hook.validate_options(self, options)?;
        }
        Ok(())
    }

    fn write_lock(&self, model: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.write_locks.entry(model.to_string()).or_default().value())
    }

    // ========== Hook-free row operations ==========

    /// Insert a row without running hooks. Returns the stored row.
    pub fn insert_row(&self, model: &str, values: Row) -> Result<Row, Error> {
        let def = self.model(model)?;
        let (stored, _) = self.store_new(&def, values)?;
        Ok(stored)
    }

    /// Select rows whose stored fields equal every value in `filter`.
    pub fn select_rows(&self, model: &str, filter: &Row) -> Result<Vec<Row>, Error> {
        let def = self.model(model)?;
        check_filter(&def, filter)?;

        if filter.len() == 1 {
            if let Some(id) = filter.get(&def.identity_field) {
                if id.is_null() {
                    return Ok(Vec::new());
                }
                return Ok(self
                    .storage
                    .get(&def.name, id)?
                    .map(|record| vec![record.to_row()])
                    .unwrap_or_default());
            }
        }

        let mut rows = Vec::new();
        for record in self.storage.scan(&def.name)? {
            let row = record?.to_row();
            if row.matches(filter) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Apply `changes` to every row matching `filter`. Returns the number of rows written.
    pub fn update_rows(&self, model: &str, filter: &Row, changes: &Row) -> Result<usize, Error> {
        let def = self.model(model)?;
        check_changes(&def, changes)?;

        let mut written = 0;
        for row in self.select_rows(model, filter)? {
            self.rewrite(&def, row, changes)?;
            written += 1;
        }
        Ok(written)
    }

    /// Delete every row matching `filter`. Returns the number of rows removed.
    pub fn delete_rows(&self, model: &str, filter: &Row) -> Result<usize, Error> {
        let def = self.model(model)?;

        let mut removed = 0;
        for row in self.select_rows(model, filter)? {
            let id = row.get(&def.identity_field).cloned().unwrap_or(Value::Null);
            if self.storage.remove(&def.name, &id)? {
                removed += 1;
            }
        }
        debug!(model, removed, "rows deleted");
        Ok(removed)
    }

    // ========== Pipeline operations ==========

    /// Create a record and run `after_create` hooks.
    ///
    /// A failing hook removes the base row again and lets every hook clean up
    /// as on destroy before the error is returned.
    pub fn create(&self, model: &str, values: Row, options: &CallOptions) -> Result<Instance, Error> {
        let def = self.model(model)?;
        let hooks = self.hooks_for(model);
        self.validate_options(&hooks, options)?;
        let (stored, virtuals) = self.store_new(&def, values)?;

        let id = stored
            .get(&def.identity_field)
            .cloned()
            .unwrap_or(Value::Null);
        let mut row = stored;
        row.merge(&virtuals);
        let mut instance = Instance::new(model, id, row);

        for hook in &hooks {
            if let Err(e) = hook.after_create(self, &mut instance, options) {
                self.undo_create(&def, &instance, &hooks);
                return Err(e);
            }
        }
        Ok(instance)
    }

    /// Load a record by primary key and run `after_find` hooks.
    pub fn find_by_id(
        &self,
        model: &str,
        id: impl Into<Value>,
        options: &CallOptions,
    ) -> Result<Option<Instance>, Error> {
        let def = self.model(model)?;
        self.validate_options(&self.hooks_for(model), options)?;
        let id = id.into();

        let record = match self.storage.get(&def.name, &id)? {
            Some(record) => record,
            None => return Ok(None),
        };
        self.materialize(&def, record.to_row(), options).map(Some)
    }

    /// Load every record matching `filter` and run `after_find` hooks on each.
    pub fn find_all(
        &self,
        model: &str,
        filter: &Row,
        options: &CallOptions,
    ) -> Result<Vec<Instance>, Error> {
        let def = self.model(model)?;
        self.validate_options(&self.hooks_for(model), options)?;
        self.select_rows(model, filter)?
            .into_iter()
            .map(|row| self.materialize(&def, row, options))
            .collect()
    }

    /// Update a record.
    ///
    /// Every change is checked against the model and the record must still
    /// exist before `before_update` hooks run. Hooks may then claim fields;
    /// what is left is written to the base row and mirrored onto the instance.
    pub fn update(
        &self,
        instance: &mut Instance,
        mut changes: Row,
        options: &CallOptions,
    ) -> Result<(), Error> {
        let def = self.model(instance.model())?;
        let hooks = self.hooks_for(&def.name);
        self.validate_options(&hooks, options)?;

        for (field, value) in changes.iter() {
            let field_def = def.get_field(field).ok_or_else(|| Error::UnknownField {
                model: def.name.clone(),
                field: field.clone(),
            })?;
            check_value(&def, field_def, value)?;
        }
        if changes.contains(&def.identity_field) {
            return Err(Error::InvalidKey("identity field cannot be updated".into()));
        }

        let current = self
            .storage
            .get(&def.name, instance.id())?
            .ok_or_else(|| Error::NotFound(def.name.clone()))?
            .to_row();
        let stored_changes = stored_subset(&def, &changes);
        if !stored_changes.is_empty() {
            let mut merged = current.clone();
            merged.merge(&stored_changes);
            self.check_unique(&def, &merged, Some(instance.id()))?;
        }

        for hook in &hooks {
            hook.before_update(self, instance, &mut changes, options)?;
        }

        let stored = changes.extract(|f| def.get_field(f).is_some_and(|fd| fd.is_stored()));
        if !stored.is_empty() {
            self.rewrite(&def, current, &stored)?;
        }

        let values = instance.values_mut();
        values.merge(&stored);
        values.merge(&changes);
        Ok(())
    }

    /// Delete a record and run `after_destroy` hooks.
    pub fn destroy(&self, instance: &Instance, options: &CallOptions) -> Result<(), Error> {
        let def = self.model(instance.model())?;
        let hooks = self.hooks_for(&def.name);
        self.validate_options(&hooks, options)?;
        if !self.storage.remove(&def.name, instance.id())? {
            return Err(Error::NotFound(def.name.clone()));
        }
        debug!(model = %def.name, id = %instance.id(), "record destroyed");

        for hook in &hooks {
            hook.after_destroy(self, instance, options)?;
        }
        Ok(())
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.storage.flush()
    }

    // ========== Internals ==========

    /// Remove a half-created record. Cleanup failures are logged, not returned.
    fn undo_create(&self, def: &EntityDef, instance: &Instance, hooks: &[Arc<dyn ModelHook>]) {
        if let Err(e) = self.storage.remove(&def.name, instance.id()) {
            warn!(model = %def.name, id = %instance.id(), error = %e, "failed to remove base row");
        }
        let options = CallOptions::new();
        for hook in hooks {
            if let Err(e) = hook.after_destroy(self, instance, &options) {
                warn!(
                    model = %def.name,
                    id = %instance.id(),
                    hook = hook.name(),
                    error = %e,
                    "cleanup after failed create"
                );
            }
        }
        debug!(model = %def.name, id = %instance.id(), "create rolled back");
    }

    fn materialize(
        &self,
        def: &EntityDef,
        mut row: Row,
        options: &CallOptions,
    ) -> Result<Instance, Error> {
        for field in def.fields.iter().filter(|f| !f.is_stored()) {
            row.set(field.name.clone(), Value::Null);
        }
        let id = row.get(&def.identity_field).cloned().unwrap_or(Value::Null);
        let mut instance = Instance::new(def.name.clone(), id, row);

        for hook in self.hooks_for(&def.name) {
            hook.after_find(self, &mut instance, options)?;
        }
        Ok(instance)
    }

    /// Validate, fill defaults and store a new row.
    ///
    /// Returns the stored row and the virtual values supplied alongside it.
    fn store_new(&self, def: &EntityDef, mut values: Row) -> Result<(Row, Row), Error> {
        if let Some(field) = values.fields().find(|f| def.get_field(f).is_none()) {
            return Err(Error::UnknownField {
                model: def.name.clone(),
                field: field.to_string(),
            });
        }

        let mut virtuals = values.extract(|f| def.get_field(f).is_some_and(|fd| !fd.is_stored()));
        for field in def.fields.iter().filter(|f| !f.is_stored()) {
            let value = virtuals.get(&field.name).cloned().unwrap_or(Value::Null);
            check_value(def, field, &value)?;
            virtuals.set(field.name.clone(), value);
        }

        let mut stored = Row::new();
        for field in def.stored_fields() {
            let value = match values.remove(&field.name) {
                Some(value) if !value.is_null() => {
                    if field.auto_increment {
                        if let Value::Int(explicit) = value {
                            self.storage.observe_sequence(&def.name, explicit)?;
                        }
                    }
                    value
                }
                _ if field.auto_increment => Value::Int(self.storage.next_sequence(&def.name)?),
                _ => field
                    .default
                    .as_ref()
                    .map(|d| d.resolve())
                    .unwrap_or(Value::Null),
            };
            check_value(def, field, &value)?;
            stored.set(field.name.clone(), value);
        }

        let id = stored
            .get(&def.identity_field)
            .cloned()
            .unwrap_or(Value::Null);
        {
            let lock = self.write_lock(&def.name);
            let _guard = lock.lock();
            self.check_unique(def, &stored, None)?;
            if !self.storage.insert(&def.name, &id, &Record::new(&stored))? {
                return Err(Error::UniqueViolation {
                    model: def.name.clone(),
                    fields: vec![def.identity_field.clone()],
                });
            }
        }
        debug!(model = %def.name, id = %id, "row inserted");

        Ok((stored, virtuals))
    }

    fn rewrite(&self, def: &EntityDef, current: Row, changes: &Row) -> Result<(), Error> {
        let id = current
            .get(&def.identity_field)
            .cloned()
            .unwrap_or(Value::Null);
        let mut row = current;
        row.merge(changes);

        {
            let lock = self.write_lock(&def.name);
            let _guard = lock.lock();
            if self.storage.get(&def.name, &id)?.is_none() {
                return Err(Error::NotFound(def.name.clone()));
            }
            self.check_unique(def, &row, Some(&id))?;
            self.storage.put(&def.name, &id, &Record::new(&row))?;
        }
        debug!(model = %def.name, id = %id, fields = changes.len(), "row updated");
        Ok(())
    }

    /// Reject rows colliding with another row on any unique group.
    ///
    /// Groups containing a null value never collide.
    fn check_unique(&self, def: &EntityDef, row: &Row, own_id: Option<&Value>) -> Result<(), Error> {
        for group in &def.unique_groups {
            let filter: Row = group
                .iter()
                .map(|f| (f.clone(), row.get(f).cloned().unwrap_or(Value::Null)))
                .collect();
            if filter.iter().any(|(_, v)| v.is_null()) {
                continue;
            }

            for record in self.storage.scan(&def.name)? {
                let other = record?.to_row();
                if other.get(&def.identity_field) == own_id {
                    continue;
                }
                if other.matches(&filter) {
                    return Err(Error::UniqueViolation {
                        model: def.name.clone(),
                        fields: group.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_value(def: &EntityDef, field: &crate::catalog::FieldDef, value: &Value) -> Result<(), Error> {
    if field.accepts(value) {
        return Ok(());
    }
    if value.is_null() {
        return Err(Error::MissingField {
            model: def.name.clone(),
            field: field.name.clone(),
        });
    }
    Err(Error::TypeMismatch {
        model: def.name.clone(),
        field: field.name.clone(),
        expected: field.scalar_type().to_string(),
    })
}

/// The changes that land in stored fields.
fn stored_subset(def: &EntityDef, changes: &Row) -> Row {
    changes
        .iter()
        .filter(|(f, _)| def.get_field(f).is_some_and(|fd| fd.is_stored()))
        .map(|(f, v)| (f.clone(), v.clone()))
        .collect()
}

fn check_filter(def: &EntityDef, filter: &Row) -> Result<(), Error> {
    match filter
        .fields()
        .find(|f| !def.get_field(f).is_some_and(|fd| fd.is_stored()))
    {
        Some(field) => Err(Error::UnknownField {
            model: def.name.clone(),
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_changes(def: &EntityDef, changes: &Row) -> Result<(), Error> {
    check_filter(def, changes)?;
    if changes.contains(&def.identity_field) {
        return Err(Error::InvalidKey("identity field cannot be updated".into()));
    }
    for (name, value) in changes.iter() {
        if let Some(field) = def.get_field(name) {
            check_value(def, field, value)?;
        }
    }
    Ok(())
}
