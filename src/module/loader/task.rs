//! Two-phase inclusion task
//!
//! Everything an inclusion needs after the synchronous part of `include` has
//! run: the deduplicated file lists, the post hook, the caller's callback and
//! the fetcher. Owns all of it so it can run detached from the loader.

use std::sync::Arc;
use tracing::debug;

use crate::module::traits::{AssetFetcher, FileSet, Hook, IncludeCallback, IncludeOptions};

pub(crate) struct InclusionTask<F> {
    pub(crate) id: String,
    pub(crate) dependencies: FileSet,
    pub(crate) files: FileSet,
    pub(crate) options: IncludeOptions,
    pub(crate) after_include: Option<Hook>,
    pub(crate) callback: Option<IncludeCallback>,
    pub(crate) fetcher: Arc<F>,
}

impl<F: AssetFetcher> InclusionTask<F> {
    /// Fetch dependencies, then own files, then run the post hook and callback
    ///
    /// Own files never start before every dependency has settled.
    pub(crate) async fn run(self) {
        debug!(
            "Loading {} dependency files for {}",
            self.dependencies.len(),
            self.id
        );
        self.fetcher
            .load_assets(&self.dependencies, &self.options)
            .await;

        debug!("Loading {} files for {}", self.files.len(), self.id);
        self.fetcher.load_assets(&self.files, &self.options).await;

        if let Some(hook) = &self.after_include {
            hook();
        }

        if let Some(callback) = self.callback {
            callback();
        }

        debug!("Module {} included", self.id);
    }
}
