//! ORMDB model layer.
//!
//! A small embedded model store: entity definitions, sled-backed rows and a
//! lifecycle hook pipeline that extensions plug into.

pub mod catalog;
pub mod database;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod value;

#[cfg(feature = "async")]
pub mod async_api;

pub use catalog::{DefaultValue, EntityDef, FieldDef, FieldType, ScalarType};
pub use database::Database;
pub use error::{Error, PluginError, Result};
pub use pipeline::{CallOptions, DefinePlugin, Instance, ModelHook};
pub use storage::{StorageConfig, StorageEngine};
pub use value::{Row, Value};

#[cfg(feature = "async")]
pub use async_api::AsyncDatabase;
