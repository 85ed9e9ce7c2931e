//! Shared fixtures for loader tests

#![allow(dead_code)]

use async_trait::async_trait;
use moff_amd::module::{
    AssetFetcher, FileSet, IncludeCallback, IncludeOptions, ModuleLoader, StaticHost,
};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use url::Url;

/// Ordered log shared by fetchers, hooks and callbacks
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    /// Callback that appends `entry` when run
    pub fn callback(&self, entry: &str) -> IncludeCallback {
        let log = self.clone();
        let entry = entry.to_string();
        Box::new(move || log.push(entry))
    }

    /// Hook that appends `entry` every time it runs
    pub fn hook(&self, entry: &str) -> impl Fn() + Send + Sync + 'static {
        let log = self.clone();
        let entry = entry.to_string();
        move || log.push(entry.clone())
    }
}

/// Render a file set the way the recording fetcher logs it
pub fn describe(files: &FileSet) -> String {
    let all: Vec<&str> = files
        .scripts
        .iter()
        .chain(files.styles.iter())
        .map(String::as_str)
        .collect();
    format!("[{}]", all.join(","))
}

/// Fetcher that records every call and completes after a scheduler yield
///
/// With a gate, each call additionally waits for one permit released by the
/// test through [`RecordingFetcher::release`].
pub struct RecordingFetcher {
    log: EventLog,
    calls: Mutex<Vec<(FileSet, IncludeOptions)>>,
    gate: Option<Semaphore>,
}

impl RecordingFetcher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(log: EventLog) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(log)
        }
    }

    pub fn release(&self, fetches: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(fetches);
        }
    }

    pub fn calls(&self) -> Vec<(FileSet, IncludeOptions)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every URL handed to the fetcher so far, in call order
    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .flat_map(|(files, _)| files.scripts.into_iter().chain(files.styles))
            .collect()
    }
}

#[async_trait]
impl AssetFetcher for RecordingFetcher {
    async fn load_assets(&self, files: &FileSet, options: &IncludeOptions) {
        self.calls.lock().unwrap().push((files.clone(), *options));
        self.log.push(format!("start {}", describe(files)));

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        tokio::task::yield_now().await;

        self.log.push(format!("end {}", describe(files)));
    }
}

pub fn test_host() -> StaticHost {
    StaticHost::new(Url::parse("http://h/").unwrap())
}

pub fn new_loader() -> (
    EventLog,
    Arc<RecordingFetcher>,
    ModuleLoader<RecordingFetcher, StaticHost>,
) {
    let log = EventLog::default();
    let fetcher = Arc::new(RecordingFetcher::new(log.clone()));
    let loader = ModuleLoader::new(Arc::clone(&fetcher), test_host());
    (log, fetcher, loader)
}

/// Let spawned tasks on the current-thread runtime make progress
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
