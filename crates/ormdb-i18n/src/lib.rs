//! ORMDB i18n - per-language translation tables for ORMDB models.
//!
//! Fields marked translatable on a model are moved into a shadow table named
//! `<model>_i18n`, one row per language. Lifecycle hooks keep that table in
//! step with the base model so callers read and write a single record and pick
//! the language through call options.
//!
//! ```no_run
//! use ormdb_i18n::{I18n, I18nConfig};
//! use ormdb_model::{CallOptions, Database, EntityDef, FieldDef, Row, ScalarType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::temporary()?;
//! let i18n = I18n::new(I18nConfig::new(["FR", "EN"]))?;
//! i18n.init(&db);
//!
//! db.define(
//!     EntityDef::new("product", "id")
//!         .with_field(FieldDef::scalar("id", ScalarType::Int64).auto_increment())
//!         .with_field(FieldDef::scalar("name", ScalarType::String).translatable()),
//! )?;
//!
//! let mut product = db.create("product", Row::new().with("name", "chaise"), &CallOptions::new())?;
//! db.update(&mut product, Row::new().with("name", "chair"), &i18n.options("EN"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod extension;
pub mod hooks;
pub mod language;
pub mod registry;
pub mod utils;

pub use config::{I18nConfig, SeedPolicy};
pub use descriptor::{TranslationDescriptor, ID_FIELD, LANGUAGE_FIELD, PARENT_FIELD};
pub use error::{Error, Result};
pub use extension::I18n;
pub use hooks::TranslationHooks;
pub use language::{Language, LanguageSet};
pub use registry::I18nRegistry;
pub use utils::{
    language_column_type, to_sequence, translation_table_name, translation_table_name_with_suffix,
    OneOrMany,
};
