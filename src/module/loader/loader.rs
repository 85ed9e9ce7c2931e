//! Module inclusion engine
//!
//! Owns the registry, the asset tracker and the deferred-include queue, and
//! decides for every `include` whether to load now, defer, or answer from the
//! already-loaded state.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::module::api::events::HostEvent;
use crate::module::assets::AssetTracker;
use crate::module::loader::task::InclusionTask;
use crate::module::registry::{ModuleDescriptor, ModuleRegistry, RegisteredModule};
use crate::module::traits::{
    AssetFetcher, FileSet, HostEnvironment, IncludeCallback, IncludeOptions, ModuleError,
};

/// What a single `include` call did
pub enum IncludeOutcome {
    /// Id is not registered; nothing fetched, callback dropped
    NotRegistered,
    /// Module was already loaded; callback ran synchronously
    AlreadyLoaded,
    /// Queued until the host-ready signal
    Deferred,
    /// Inclusion started; the handle resolves after the callback ran
    Started(JoinHandle<()>),
}

impl IncludeOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, IncludeOutcome::Started(_))
    }

    /// Wait for a started inclusion to finish; other outcomes return at once
    pub async fn finished(self) {
        if let IncludeOutcome::Started(handle) = self {
            if let Err(e) = handle.await {
                warn!("Inclusion task failed: {}", e);
            }
        }
    }
}

impl fmt::Debug for IncludeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeOutcome::NotRegistered => f.write_str("NotRegistered"),
            IncludeOutcome::AlreadyLoaded => f.write_str("AlreadyLoaded"),
            IncludeOutcome::Deferred => f.write_str("Deferred"),
            IncludeOutcome::Started(_) => f.write_str("Started"),
        }
    }
}

/// Second positional argument of the legacy `include(id, callbackOrOptions, options)` form
pub enum IncludeArg {
    Callback(IncludeCallback),
    Options(IncludeOptions),
}

impl IncludeArg {
    pub fn callback<F>(callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        IncludeArg::Callback(Box::new(callback))
    }

    /// Split the legacy arguments into an explicit callback and options
    ///
    /// Options passed in second position win over the third argument.
    pub fn normalize(
        second: Option<IncludeArg>,
        options: Option<IncludeOptions>,
    ) -> (Option<IncludeCallback>, IncludeOptions) {
        match second {
            Some(IncludeArg::Callback(callback)) => (Some(callback), options.unwrap_or_default()),
            Some(IncludeArg::Options(options)) => (None, options),
            None => (None, options.unwrap_or_default()),
        }
    }
}

impl From<IncludeOptions> for IncludeArg {
    fn from(options: IncludeOptions) -> Self {
        IncludeArg::Options(options)
    }
}

/// Include queued until the host-ready signal
struct DeferredInclude {
    id: String,
    callback: Option<IncludeCallback>,
}

/// Module registry and inclusion engine
///
/// One instance per host session. Every mutation goes through `&mut self`, so
/// the loader is the only writer of the registry and the asset storage.
pub struct ModuleLoader<F, H> {
    registry: ModuleRegistry,
    assets: AssetTracker,
    deferred: VecDeque<DeferredInclude>,
    host_ready: bool,
    fetcher: Arc<F>,
    host: H,
}

impl<F, H> ModuleLoader<F, H>
where
    F: AssetFetcher + 'static,
    H: HostEnvironment,
{
    /// Create a loader resolving relative asset URLs against the host's base URL
    pub fn new(fetcher: Arc<F>, host: H) -> Self {
        let assets = AssetTracker::new(host.base_url().clone());
        Self {
            registry: ModuleRegistry::new(),
            assets,
            deferred: VecDeque::new(),
            host_ready: false,
            fetcher,
            host,
        }
    }

    /// Register (or replace) a module descriptor
    pub fn register(&mut self, descriptor: ModuleDescriptor) {
        self.registry.register(descriptor);
    }

    /// Include a module by id
    ///
    /// Runs synchronously up to the first fetch: lookup, loaded check,
    /// host-ready gate, deduplication and `before_include`. The two fetch
    /// phases, `after_include` and `callback` run on a spawned task.
    ///
    /// An unknown id is logged and answered with
    /// [`IncludeOutcome::NotRegistered`]; the callback is dropped without
    /// running. A malformed asset URL fails the call with
    /// [`ModuleError::InvalidUrl`] and leaves the module marked loaded.
    ///
    /// # Panics
    ///
    /// Starting an inclusion spawns onto the current Tokio runtime and panics
    /// outside of one.
    pub fn include(
        &mut self,
        id: &str,
        callback: Option<IncludeCallback>,
        options: IncludeOptions,
    ) -> Result<IncludeOutcome, ModuleError> {
        let Some(entry) = self.registry.get_mut(id) else {
            debug!("{} AMD module is not registered.", id);
            return Ok(IncludeOutcome::NotRegistered);
        };

        if entry.loaded && !options.reload {
            if let Some(callback) = callback {
                callback();
            }
            return Ok(IncludeOutcome::AlreadyLoaded);
        }

        if entry.descriptor.load_on_host_ready && !self.host_ready {
            debug!("Deferring {} until host is ready", id);
            self.deferred.push_back(DeferredInclude {
                id: id.to_string(),
                callback,
            });
            return Ok(IncludeOutcome::Deferred);
        }

        // In-flight includes count as loaded for re-entrant calls.
        entry.loaded = true;

        Self::trim_to_unseen(&mut self.assets, entry)?;

        if let Some(hook) = &entry.descriptor.before_include {
            hook();
        }

        info!(
            "Including module {} ({} dependency files, {} files)",
            id,
            entry.dependencies.len(),
            entry.files.len()
        );

        let task = InclusionTask {
            id: id.to_string(),
            dependencies: entry.dependencies.clone(),
            files: entry.files.clone(),
            options,
            after_include: entry.descriptor.after_include.clone(),
            callback,
            fetcher: Arc::clone(&self.fetcher),
        };

        Ok(IncludeOutcome::Started(tokio::spawn(task.run())))
    }

    /// Legacy calling convention: the second argument may be a callback or options
    pub fn include_with(
        &mut self,
        id: &str,
        second: Option<IncludeArg>,
        options: Option<IncludeOptions>,
    ) -> Result<IncludeOutcome, ModuleError> {
        let (callback, options) = IncludeArg::normalize(second, options);
        self.include(id, callback, options)
    }

    /// Dispatch a host lifecycle signal
    pub fn handle_host_event(&mut self, event: HostEvent) -> Vec<IncludeOutcome> {
        match event {
            HostEvent::ContentReady => self.include_for_screen(),
            HostEvent::Loaded => self.mark_host_ready(),
        }
    }

    /// Flip the host-ready flag and release deferred includes in FIFO order
    ///
    /// Only the first call has an effect.
    pub fn mark_host_ready(&mut self) -> Vec<IncludeOutcome> {
        if self.host_ready {
            warn!("Host ready signal received more than once, ignoring");
            return Vec::new();
        }

        self.host_ready = true;
        info!("Host ready, releasing {} deferred includes", self.deferred.len());
        self.drain_deferred()
    }

    /// Re-run deferred includes in the order they were requested
    ///
    /// A failing include is logged and dropped along with its callback; the
    /// rest of the queue still runs. Only started or answered includes are
    /// returned.
    pub fn drain_deferred(&mut self) -> Vec<IncludeOutcome> {
        let mut outcomes = Vec::with_capacity(self.deferred.len());
        while let Some(entry) = self.deferred.pop_front() {
            match self.include(&entry.id, entry.callback, IncludeOptions::default()) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Deferred include of {} failed: {}", entry.id, e),
            }
        }
        outcomes
    }

    /// Auto-include modules registered for the host's current screen context
    ///
    /// Modules that markup declares as loaded on element render are skipped.
    /// Candidates are visited in registration order; one failing module does
    /// not stop the sweep.
    pub fn include_for_screen(&mut self) -> Vec<IncludeOutcome> {
        let Some(context) = self.host.screen_context() else {
            debug!("Host reports no screen context, skipping auto-include");
            return Vec::new();
        };

        let ids: Vec<String> = self
            .registry
            .iter()
            .filter(|m| m.descriptor.wants_screen(&context))
            .filter(|m| !self.host.has_render_marker(m.id()))
            .map(|m| m.id().to_string())
            .collect();

        debug!("Auto-including {:?} for screen {}", ids, context);

        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            match self.include(&id, None, IncludeOptions::default()) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Auto-include of {} failed: {}", id, e),
            }
        }
        outcomes
    }

    /// Replace every working list of `entry` with its never-seen subset
    fn trim_to_unseen(
        assets: &mut AssetTracker,
        entry: &mut RegisteredModule,
    ) -> Result<(), ModuleError> {
        entry.dependencies.scripts = assets.filter_unseen(&entry.dependencies.scripts)?;
        entry.dependencies.styles = assets.filter_unseen(&entry.dependencies.styles)?;
        entry.files.styles = assets.filter_unseen(&entry.files.styles)?;
        entry.files.scripts = assets.filter_unseen(&entry.files.scripts)?;
        Ok(())
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.registry.get(id).map(|m| m.loaded).unwrap_or(false)
    }

    pub fn is_host_ready(&self) -> bool {
        self.host_ready
    }

    /// Registered ids in registration order
    pub fn module_ids(&self) -> &[String] {
        self.registry.ids()
    }

    /// Ids waiting for the host-ready signal, oldest first
    pub fn deferred_ids(&self) -> Vec<&str> {
        self.deferred.iter().map(|d| d.id.as_str()).collect()
    }

    /// Current (possibly trimmed) dependency and own file lists of a module
    pub fn working_files(&self, id: &str) -> Option<(&FileSet, &FileSet)> {
        self.registry.get(id).map(|m| (&m.dependencies, &m.files))
    }

    pub fn assets(&self) -> &AssetTracker {
        &self.assets
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
