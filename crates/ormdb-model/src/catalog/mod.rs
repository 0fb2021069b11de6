//! Model catalog.
//!
//! Describes entities, their fields and the scalar types the storage layer understands.

mod entity;
mod field;
mod types;

pub use entity::EntityDef;
pub use field::{DefaultValue, FieldDef};
pub use types::{FieldType, ScalarType};
