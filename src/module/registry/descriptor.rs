//! Module descriptors
//!
//! A descriptor is the immutable registration value for one module id. The
//! registry keeps it next to the mutable bookkeeping (`loaded` flag and
//! trimmed working file lists) in a [`RegisteredModule`].

use std::fmt;
use std::sync::Arc;

use crate::module::traits::{FileSet, Hook, ScreenContext};

/// Registration value for one module id
#[derive(Clone, Default)]
pub struct ModuleDescriptor {
    /// Module id (unique key in the registry)
    pub id: String,
    /// Files that must finish loading before this module's own files
    pub dependencies: FileSet,
    /// This module's own files
    pub files: FileSet,
    /// Screen contexts in which the module is auto-included once content is ready
    pub load_on_screen: Vec<ScreenContext>,
    /// Called right before the first fetch starts
    pub before_include: Option<Hook>,
    /// Called after both fetch phases completed, before the include callback
    pub after_include: Option<Hook>,
    /// Postpone loading until the host-ready signal
    pub load_on_host_ready: bool,
}

impl ModuleDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_dependencies(mut self, dependencies: FileSet) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_files(mut self, files: FileSet) -> Self {
        self.files = files;
        self
    }

    pub fn load_on_screen<I>(mut self, contexts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ScreenContext>,
    {
        self.load_on_screen = contexts.into_iter().map(Into::into).collect();
        self
    }

    pub fn before_include<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.before_include = Some(Arc::new(hook));
        self
    }

    pub fn after_include<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.after_include = Some(Arc::new(hook));
        self
    }

    pub fn load_on_host_ready(mut self, value: bool) -> Self {
        self.load_on_host_ready = value;
        self
    }

    /// Whether the auto-include sweep should consider this module in `context`
    pub fn wants_screen(&self, context: &ScreenContext) -> bool {
        self.load_on_screen.iter().any(|c| c == context)
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("files", &self.files)
            .field("load_on_screen", &self.load_on_screen)
            .field("before_include", &self.before_include.is_some())
            .field("after_include", &self.after_include.is_some())
            .field("load_on_host_ready", &self.load_on_host_ready)
            .finish()
    }
}

/// Registry entry: descriptor plus inclusion bookkeeping
#[derive(Debug, Clone)]
pub struct RegisteredModule {
    /// Descriptor as registered
    pub descriptor: ModuleDescriptor,
    /// Set once an inclusion pass actually starts
    pub loaded: bool,
    /// Dependency lists, trimmed by every inclusion pass
    pub dependencies: FileSet,
    /// Own file lists, trimmed by every inclusion pass
    pub files: FileSet,
}

impl RegisteredModule {
    pub fn new(descriptor: ModuleDescriptor) -> Self {
        Self {
            dependencies: descriptor.dependencies.clone(),
            files: descriptor.files.clone(),
            loaded: false,
            descriptor,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}
