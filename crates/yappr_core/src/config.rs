use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockCacheConfig {
    /// Entry lifetime; `None` keeps entries until invalidated.
    pub ttl_secs: Option<u64>,
}

impl BlockCacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeederConfig {
    /// Record filter negatives as "not blocked" instead of leaving them unknown.
    pub seed_filter_negatives: bool,
    /// Largest candidate batch sent to the authoritative lookup.
    pub max_batch: usize,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            seed_filter_negatives: true,
            max_batch: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YapprConfig {
    pub cache: BlockCacheConfig,
    pub seeder: SeederConfig,
}

impl YapprConfig {
    /// Read a JSON config; absent fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }
}
