//! Container-wide configuration.
//!
//! [`BlocksConfig`] holds the defaults a [`Blocks`](crate::Blocks) container
//! applies to bindings that leave an option unspecified. It can be built in
//! code or loaded from TOML or JSON:
//!
//! ```
//! use horizon_trellis::BlocksConfig;
//!
//! let config = BlocksConfig::from_toml_str("queue_enabled = true").unwrap();
//! assert!(config.queue_enabled);
//! assert_eq!(config.default_max_batch_size, 4);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Defaults shared by every binding registered on a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksConfig {
    /// Whether bindings with `queue = None` are queued.
    pub queue_enabled: bool,
    /// Batch size used by bindings that enable batching without choosing one.
    pub default_max_batch_size: usize,
    /// Whether the generated API surface is shown at all.
    pub show_api: bool,
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self {
            queue_enabled: false,
            default_max_batch_size: 4,
            show_api: true,
        }
    }
}

impl BlocksConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validated()
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validated()
    }

    /// Load a configuration from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Serialize this configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    fn validated(self) -> Result<Self> {
        if self.default_max_batch_size == 0 {
            return Err(Error::invalid_configuration(
                "default_max_batch_size",
                "must be at least 1",
            ));
        }
        Ok(self)
    }
}
