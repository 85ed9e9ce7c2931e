//! Module registry
//!
//! Holds registered module descriptors in registration order, along with the
//! per-module inclusion bookkeeping.

pub mod descriptor;
pub mod manifest;

pub use descriptor::{ModuleDescriptor, RegisteredModule};
pub use manifest::ModuleManifest;

use std::collections::HashMap;
use tracing::debug;

/// Registered modules, iterable in registration order
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, RegisteredModule>,
    /// Ids in first-registration order
    order: Vec<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `descriptor` under its id, replacing any previous entry
    ///
    /// A replaced entry keeps its position in registration order and starts
    /// over as not loaded.
    pub fn register(&mut self, descriptor: ModuleDescriptor) {
        let id = descriptor.id.clone();
        debug!("Registering module {}", id);

        if self
            .modules
            .insert(id.clone(), RegisteredModule::new(descriptor))
            .is_none()
        {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredModule> {
        self.modules.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut RegisteredModule> {
        self.modules.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModule> {
        self.order.iter().filter_map(|id| self.modules.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
