//! Storage layer.
//!
//! This module provides a sled-based row store with one tree per model.

mod config;
mod engine;
mod record;

pub mod key;

pub use config::StorageConfig;
pub use engine::StorageEngine;
pub use key::current_timestamp;
pub use record::{Record, RecordField};
