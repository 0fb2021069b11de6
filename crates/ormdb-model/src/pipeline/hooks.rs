//! Lifecycle hook and define plugin traits.

use crate::catalog::EntityDef;
use crate::database::Database;
use crate::error::Error;
use crate::pipeline::{CallOptions, Instance};
use crate::value::Row;

/// Hook attached to a single model's operation pipeline.
///
/// Every method defaults to a no-op. Errors abort the surrounding call and are
/// returned to the caller unchanged.
pub trait ModelHook: Send + Sync {
    /// Hook name, used in logs.
    fn name(&self) -> &str;

    /// Runs before any operation touches storage. Rejecting here leaves the
    /// database unchanged.
    fn validate_options(&self, _db: &Database, _options: &CallOptions) -> Result<(), Error> {
        Ok(())
    }

    /// Runs after the base row has been stored.
    fn after_create(
        &self,
        _db: &Database,
        _instance: &mut Instance,
        _options: &CallOptions,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Runs after a row has been loaded into an instance.
    fn after_find(
        &self,
        _db: &Database,
        _instance: &mut Instance,
        _options: &CallOptions,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Runs before changes are written. Fields removed from `changes` are not
    /// written to the base row.
    fn before_update(
        &self,
        _db: &Database,
        _instance: &mut Instance,
        _changes: &mut Row,
        _options: &CallOptions,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Runs after the base row has been removed.
    fn after_destroy(
        &self,
        _db: &Database,
        _instance: &Instance,
        _options: &CallOptions,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Plugin consulted on every model definition.
pub trait DefinePlugin: Send + Sync {
    /// Plugin name, used in logs.
    fn name(&self) -> &str;

    /// May rewrite the definition before it is registered.
    fn before_define(&self, _def: &mut EntityDef) -> Result<(), Error> {
        Ok(())
    }

    /// Runs once the definition is registered.
    fn after_define(&self, _db: &Database, _def: &EntityDef) -> Result<(), Error> {
        Ok(())
    }
}
