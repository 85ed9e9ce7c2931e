//! Configuration management for the module loader
//!
//! Handles configuration loading (JSON or TOML) and validation.

use crate::module::registry::ModuleManifest;
use crate::module::traits::ScreenContext;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "moff_amd=debug"); RUST_LOG takes precedence
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines (requires the `json-logging` feature)
    #[serde(default = "default_false")]
    pub json_format: bool,
}

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Document URL that relative asset URLs resolve against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Screen context reported to the auto-include sweep
    #[serde(default)]
    pub screen_context: Option<ScreenContext>,

    /// Module ids that markup declares as loaded on element render
    #[serde(default)]
    pub render_markers: Vec<String>,

    /// Modules registered at startup
    #[serde(default)]
    pub modules: Vec<ModuleManifest>,

    /// Logging configuration
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

fn default_false() -> bool {
    false
}

fn default_base_url() -> String {
    "http://localhost/".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            screen_context: None,
            render_markers: Vec::new(),
            modules: Vec::new(),
            logging: None,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LoaderConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LoaderConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            other => anyhow::bail!("Unsupported config file extension: {:?}", other),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid base_url {:?}: {}", self.base_url, e))?;

        let mut seen = HashSet::new();
        for manifest in &self.modules {
            manifest.validate()?;
            if !seen.insert(manifest.id.as_str()) {
                anyhow::bail!("Module {} is configured more than once", manifest.id);
            }
        }

        Ok(())
    }
}
