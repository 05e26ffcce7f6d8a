use anyhow::Context;
use recfeed_core::Config as CoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CLI-level configuration: the ranking core's tunables plus where to load
/// the catalog from. Loaded once at startup from an optional TOML file,
/// falling back to the core's own defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub core: CoreConfig,
    pub catalog_path: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            catalog_path: None,
        }
    }
}

impl CliConfig {
    /// Load from `path` if given, falling back to defaults. Unlike JSON or
    /// YAML, `toml` is the only format this CLI speaks - the core has no
    /// opinion on external config formats, but this binary picks one.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}
