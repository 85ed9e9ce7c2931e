//! Module system traits and interfaces
//!
//! Defines the core value types shared by the registry and the inclusion engine,
//! and the traits the loader uses to talk to its host environment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Lifecycle hook attached to a module descriptor
///
/// Hooks take no arguments and are shared between the registry entry and any
/// inclusion task currently running for that module.
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Caller-supplied completion callback for a single `include` call
pub type IncludeCallback = Box<dyn FnOnce() + Send>;

/// A set of script and style URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    /// Script URLs
    #[serde(default, alias = "js")]
    pub scripts: Vec<String>,
    /// Stylesheet URLs
    #[serde(default, alias = "css")]
    pub styles: Vec<String>,
}

impl FileSet {
    /// Create a file set from script and style lists
    pub fn new<S, T>(scripts: S, styles: T) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            scripts: scripts.into_iter().map(Into::into).collect(),
            styles: styles.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a file set holding only scripts
    pub fn scripts<S>(scripts: S) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self::new(scripts, Vec::<String>::new())
    }

    /// Create a file set holding only styles
    pub fn styles<T>(styles: T) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self::new(Vec::<String>::new(), styles)
    }

    /// True when the set lists no files at all
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.styles.is_empty()
    }

    /// Total number of listed files
    pub fn len(&self) -> usize {
        self.scripts.len() + self.styles.len()
    }
}

/// Opaque screen/mode identifier used by the auto-include sweep
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenContext(pub String);

impl ScreenContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScreenContext {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Options recognised by `include`
///
/// Forwarded unchanged to the asset fetcher for both fetch phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeOptions {
    /// Load again even if the module is already marked loaded
    #[serde(default)]
    pub reload: bool,
}

impl IncludeOptions {
    pub fn reload() -> Self {
        Self { reload: true }
    }
}

/// Asset fetch primitive
///
/// `load_assets` resolves once every listed file has finished loading. The
/// loader treats any completion as "proceed"; success or failure policy for
/// individual files belongs to the implementation. A future that never
/// resolves stalls the module's `after_include` hook and callback forever.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn load_assets(&self, files: &FileSet, options: &IncludeOptions);
}

/// Host environment queries used by the loader
pub trait HostEnvironment: Send + Sync {
    /// Document URL that relative asset URLs resolve against
    fn base_url(&self) -> &Url;

    /// Current screen context, if the host reports one
    fn screen_context(&self) -> Option<ScreenContext>;

    /// Whether markup declares `module_id` as loaded on element render
    ///
    /// Such modules are skipped by the auto-include sweep.
    fn has_render_marker(&self, module_id: &str) -> bool;
}

/// Module system errors
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Invalid asset URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid module manifest: {0}")]
    InvalidManifest(String),

    #[error("Module manager is no longer running")]
    ManagerStopped,

    #[error("Include of {0} finished without running its callback")]
    IncludeAbandoned(String),
}
