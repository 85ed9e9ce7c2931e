//! Configuration-driven host environment

use std::collections::HashSet;
use url::Url;

use crate::config::LoaderConfig;
use crate::module::traits::{HostEnvironment, ScreenContext};

/// Host environment backed by fixed values
///
/// Useful wherever the real document is not available: server-side planning,
/// tests, or embedding hosts that report state up front.
#[derive(Debug, Clone)]
pub struct StaticHost {
    base_url: Url,
    screen_context: Option<ScreenContext>,
    render_markers: HashSet<String>,
}

impl StaticHost {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            screen_context: None,
            render_markers: HashSet::new(),
        }
    }

    /// Build from loader configuration
    pub fn from_config(config: &LoaderConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            base_url,
            screen_context: config.screen_context.clone(),
            render_markers: config.render_markers.iter().cloned().collect(),
        })
    }

    pub fn with_screen_context(mut self, context: impl Into<ScreenContext>) -> Self {
        self.screen_context = Some(context.into());
        self
    }

    pub fn with_render_marker(mut self, module_id: impl Into<String>) -> Self {
        self.render_markers.insert(module_id.into());
        self
    }

    pub fn set_screen_context(&mut self, context: Option<ScreenContext>) {
        self.screen_context = context;
    }
}

impl HostEnvironment for StaticHost {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn screen_context(&self) -> Option<ScreenContext> {
        self.screen_context.clone()
    }

    fn has_render_marker(&self, module_id: &str) -> bool {
        self.render_markers.contains(module_id)
    }
}
