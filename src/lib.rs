//! Moff AMD - on-demand module loader for scripts and stylesheets
//!
//! A registry maps module ids to their script/style files and the files those
//! depend on. Including a module fetches its dependencies, then its own files,
//! then runs its hooks and the caller's callback, with every asset URL fetched
//! at most once across all modules.
//!
//! ## Design Principles
//!
//! 1. **Single writer**: one [`ModuleLoader`] owns the registry and asset storage
//! 2. **Host collaborators behind traits**: fetching ([`AssetFetcher`]) and
//!    document queries ([`HostEnvironment`]) are supplied by the embedder
//! 3. **Never blocks**: `include` returns immediately; fetching runs on a task
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use moff_amd::module::*;
//! use url::Url;
//!
//! struct NoopFetcher;
//!
//! #[async_trait]
//! impl AssetFetcher for NoopFetcher {
//!     async fn load_assets(&self, _files: &FileSet, _options: &IncludeOptions) {}
//! }
//!
//! # async fn demo() -> Result<(), ModuleError> {
//! let host = StaticHost::new(Url::parse("https://example.com/").unwrap());
//! let mut loader = ModuleLoader::new(Arc::new(NoopFetcher), host);
//! loader.register(
//!     ModuleDescriptor::new("gallery")
//!         .with_dependencies(FileSet::scripts(["/vendor/slider.js"]))
//!         .with_files(FileSet::new(["/js/gallery.js"], ["/css/gallery.css"])),
//! );
//! loader.include("gallery", None, IncludeOptions::default())?.finished().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod module;
pub mod utils;

pub use config::{LoaderConfig, LoggingConfig};
pub use module::{
    AssetFetcher, FileSet, HostEnvironment, IncludeOptions, ModuleDescriptor, ModuleError,
    ModuleLoader, ModuleManager, ModuleManagerHandle,
};
