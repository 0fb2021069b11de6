//! Async facade over [`Database`].
//!
//! Each call runs on tokio's blocking pool and resolves to the same result the
//! synchronous method would return.

use std::sync::Arc;

use crate::database::Database;
use crate::error::Error;
use crate::pipeline::{CallOptions, Instance};
use crate::value::{Row, Value};

/// Shared handle issuing deferred database calls.
#[derive(Clone)]
pub struct AsyncDatabase {
    inner: Arc<Database>,
}

impl AsyncDatabase {
    /// Wrap a database.
    pub fn new(db: Database) -> Self {
        Self::from_arc(Arc::new(db))
    }

    /// Wrap an already shared database.
    pub fn from_arc(inner: Arc<Database>) -> Self {
        Self { inner }
    }

    /// The wrapped database.
    pub fn inner(&self) -> &Arc<Database> {
        &self.inner
    }

    async fn run<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&Database) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| Error::Task(e.to_string()))?
    }

    /// See [`Database::create`].
    pub async fn create(
        &self,
        model: impl Into<String>,
        values: Row,
        options: CallOptions,
    ) -> Result<Instance, Error> {
        let model = model.into();
        self.run(move |db| db.create(&model, values, &options)).await
    }

    /// See [`Database::find_by_id`].
    pub async fn find_by_id(
        &self,
        model: impl Into<String>,
        id: impl Into<Value>,
        options: CallOptions,
    ) -> Result<Option<Instance>, Error> {
        let model = model.into();
        let id = id.into();
        self.run(move |db| db.find_by_id(&model, id, &options)).await
    }

    /// See [`Database::find_all`].
    pub async fn find_all(
        &self,
        model: impl Into<String>,
        filter: Row,
        options: CallOptions,
    ) -> Result<Vec<Instance>, Error> {
        let model = model.into();
        self.run(move |db| db.find_all(&model, &filter, &options))
            .await
    }

    /// See [`Database::update`]. Returns the updated instance.
    pub async fn update(
        &self,
        mut instance: Instance,
        changes: Row,
        options: CallOptions,
    ) -> Result<Instance, Error> {
        self.run(move |db| {
            db.update(&mut instance, changes, &options)?;
            Ok(instance)
        })
        .await
    }

    /// See [`Database::destroy`].
    pub async fn destroy(&self, instance: Instance, options: CallOptions) -> Result<(), Error> {
        self.run(move |db| db.destroy(&instance, &options)).await
    }
}
