//! Per-call options.

use std::collections::BTreeMap;

use crate::value::Value;

/// Open key/value bag passed through every pipeline call.
///
/// The model layer never reads these; hooks and plugins agree on their own keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    params: BTreeMap<String, Value>,
}

impl CallOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style set.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set an option.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(key.into(), value.into());
    }

    /// Get an option. Null values count as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|v| !v.is_null())
    }

    /// Check if no options are set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
