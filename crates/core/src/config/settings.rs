use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::MethodDisplay;

/// Runner configuration file contents. Every field is optional; unset
/// fields fall back to the [`DiscoveryOptions`](super::DiscoveryOptions) defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_display: Option<MethodDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_enumerate_theories: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic_messages: Option<bool>,
    /// `false` runs collections one at a time, whatever the assembly declares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelize_test_collections: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel_threads: Option<u64>,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config {}: {e}", path.display())))?;
        Ok(config)
    }

    /// Load the configuration file of a test assembly. No path, or a path
    /// that does not exist, yields the default configuration.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                tracing::debug!("Loading runner config from {:?}", path);
                Self::load_from_file(path)
            }
            Some(path) => {
                tracing::debug!("Runner config {:?} not found, using defaults", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
