//! Asset deduplication
//!
//! Remembers every asset URL handed out for loading, keyed by host and
//! pathname, so that the same file is never requested twice no matter which
//! module or which list (dependencies or own files) names it.

use std::collections::{HashMap, HashSet};
use tracing::debug;
use url::Url;

use crate::module::traits::ModuleError;

/// Tracks which assets have already been handed out for loading
///
/// Storage only ever grows. Query strings and fragments are not part of the
/// key, so `app.js?v=1` and `app.js?v=2` name the same asset.
#[derive(Debug, Clone)]
pub struct AssetTracker {
    /// Document URL relative asset URLs resolve against
    base_url: Url,
    /// host -> pathnames already seen on that host
    storage: HashMap<String, HashSet<String>>,
}

impl AssetTracker {
    /// Create an empty tracker resolving relative URLs against `base_url`
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            storage: HashMap::new(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the URLs from `urls` that were never seen before, in input order
    ///
    /// Every returned URL is marked seen, so an overlapping second call only
    /// returns what the first did not. A URL that fails to resolve aborts the
    /// pass with [`ModuleError::InvalidUrl`]; URLs earlier in the list stay
    /// marked.
    pub fn filter_unseen(&mut self, urls: &[String]) -> Result<Vec<String>, ModuleError> {
        let mut unseen = Vec::with_capacity(urls.len());

        for url in urls {
            let (host, path) = self.key(url)?;
            let paths = self.storage.entry(host).or_default();

            if paths.insert(path) {
                unseen.push(url.clone());
            } else {
                debug!("Skipping already loaded asset {}", url);
            }
        }

        Ok(unseen)
    }

    /// Whether `url` has already been handed out
    pub fn is_seen(&self, url: &str) -> Result<bool, ModuleError> {
        let (host, path) = self.key(url)?;
        Ok(self
            .storage
            .get(&host)
            .map(|paths| paths.contains(&path))
            .unwrap_or(false))
    }

    /// Number of distinct assets seen so far
    pub fn seen_count(&self) -> usize {
        self.storage.values().map(HashSet::len).sum()
    }

    /// Resolve `url` into its `(host, pathname)` storage key
    ///
    /// The host includes a non-default port, matching what a browser reports
    /// for `location.host`. URLs without a host (`data:`, `file:`) share the
    /// empty host.
    fn key(&self, url: &str) -> Result<(String, String), ModuleError> {
        let resolved = self
            .base_url
            .join(url)
            .map_err(|source| ModuleError::InvalidUrl {
                url: url.to_string(),
                source,
            })?;

        let host = match (resolved.host_str(), resolved.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        Ok((host, resolved.path().to_string()))
    }
}
