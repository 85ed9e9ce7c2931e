//! Module loading system
//!
//! The inclusion engine and the two-phase fetch task it spawns.

pub mod loader;
mod task;

pub use loader::{IncludeArg, IncludeOutcome, ModuleLoader};
