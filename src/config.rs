//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::pathfind::SearchOptions;
use crate::resolver::ResolverOptions;

/// Tunables for the end-to-end recommendation flow. Every field has a
/// serving default; deserialize from whatever configuration layer the
/// application uses, or take `EngineConfig::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchOptions,
    pub resolver: ResolverOptions,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_secs)
    }
}
