//! Registry of translation descriptors keyed by base model name.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use crate::descriptor::TranslationDescriptor;

/// In-memory descriptor registry owned by the extension.
#[derive(Debug, Default)]
pub struct I18nRegistry {
    descriptors: DashMap<String, Arc<TranslationDescriptor>>,
}

impl I18nRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its base model, replacing any previous one.
    pub fn register(&self, descriptor: TranslationDescriptor) -> Arc<TranslationDescriptor> {
        let descriptor = Arc::new(descriptor);
        let model = descriptor.base_model().to_string();
        if self
            .descriptors
            .insert(model.clone(), Arc::clone(&descriptor))
            .is_some()
        {
            warn!(model = %model, "replaced translation descriptor");
        }
        descriptor
    }

    /// Descriptor for a base model.
    pub fn get(&self, model: &str) -> Option<Arc<TranslationDescriptor>> {
        self.descriptors.get(model).map(|d| Arc::clone(d.value()))
    }

    /// Check if a base model has a descriptor.
    pub fn contains(&self, model: &str) -> bool {
        self.descriptors.contains_key(model)
    }

    /// Registered base model names, sorted.
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.descriptors.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
