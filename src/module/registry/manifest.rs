//! Module manifest parsing
//!
//! Declarative form of a module descriptor, as found in loader configuration or
//! a standalone `module.toml`. Manifests cannot carry lifecycle hooks.

use crate::module::registry::descriptor::ModuleDescriptor;
use crate::module::traits::{FileSet, ModuleError, ScreenContext};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Module manifest (module.toml structure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Module id
    pub id: String,
    /// Files loaded before the module's own files
    #[serde(default, alias = "depend")]
    pub dependencies: FileSet,
    /// The module's own files
    #[serde(default, alias = "file")]
    pub files: FileSet,
    /// Screen contexts that auto-include the module
    #[serde(default, alias = "loadOnScreen")]
    pub load_on_screen: Vec<ScreenContext>,
    /// Defer loading until the host-ready signal
    #[serde(default, alias = "onWindowLoad")]
    pub load_on_host_ready: bool,
}

impl ModuleManifest {
    /// Load manifest from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ModuleError::InvalidManifest(format!("Failed to read manifest file: {}", e))
        })?;

        let manifest: ModuleManifest = toml::from_str(&contents).map_err(|e| {
            ModuleError::InvalidManifest(format!("Failed to parse manifest TOML: {}", e))
        })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.id.trim().is_empty() {
            return Err(ModuleError::InvalidManifest(
                "Module id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert to a descriptor without hooks
    pub fn to_descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            id: self.id.clone(),
            dependencies: self.dependencies.clone(),
            files: self.files.clone(),
            load_on_screen: self.load_on_screen.clone(),
            before_include: None,
            after_include: None,
            load_on_host_ready: self.load_on_host_ready,
        }
    }
}

impl From<ModuleManifest> for ModuleDescriptor {
    fn from(manifest: ModuleManifest) -> Self {
        manifest.to_descriptor()
    }
}
