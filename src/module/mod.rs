//! Module system
//!
//! Registers modules (sets of script/style files plus the files they depend on)
//! and includes them on demand.
//!
//! ## Guarantees
//!
//! - **Load once**: a module is fetched at most once unless `reload` is asked for
//! - **Global deduplication**: an asset URL is handed to the fetcher once, whichever
//!   module or list names it
//! - **Ordering**: dependencies settle before own files; hooks and callback run last
//! - **Host readiness**: modules marked `load_on_host_ready` wait for the host's
//!   load signal, then run in request order

pub mod api;
pub mod assets;
pub mod loader;
pub mod manager;
pub mod registry;
pub mod traits;

pub use api::{host_event_channel, HostEvent, StaticHost};
pub use assets::AssetTracker;
pub use loader::{IncludeArg, IncludeOutcome, ModuleLoader};
pub use manager::{ModuleManager, ModuleManagerHandle};
pub use registry::{ModuleDescriptor, ModuleManifest, ModuleRegistry};
pub use traits::{
    AssetFetcher, FileSet, HostEnvironment, Hook, IncludeCallback, IncludeOptions, ModuleError,
    ScreenContext,
};
