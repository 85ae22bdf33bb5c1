//! System configuration - root configuration structure.

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::feed::FeedConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Named feeder configurations.
    pub feeders: FnvIndexMap<String<32>, FeedConfig, 8>,
}

impl SystemConfig {
    /// Get a feeder configuration by name.
    pub fn feeder(&self, name: &str) -> Option<&FeedConfig> {
        self.feeders
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// List all feeder names.
    pub fn feeder_names(&self) -> impl Iterator<Item = &str> {
        self.feeders.keys().map(|s| s.as_str())
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            feeders: FnvIndexMap::new(),
        }
    }
}
