//! In-process result cache with lazy TTL expiry.
//!
//! One fresh entry per (origin, destination, criterion) key at most.
//! Expiry is evaluated at read time: a get on an expired key is a miss and
//! evicts the stale entry. Failed lookups are never cached.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::Error;
use crate::graph::StationId;
use crate::pathfind::Criterion;
use crate::score::ScoredRoute;
use crate::traits::CacheStore;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub origin: StationId,
    pub destination: StationId,
    pub criterion: Criterion,
}

#[derive(Debug, Clone)]
struct Entry {
    value: ScoredRoute,
    expires_at: Instant,
}

/// Concurrent in-memory cache. Writers to the same key race to the last
/// write; values are derived and idempotent, so no versioning is needed.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<CacheKey, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<ScoredRoute>, Error> {
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
        };
        if expired {
            // Guard reference dropped above; safe to evict.
            self.entries.remove(key);
        }
        Ok(None)
    }

    fn put(&self, key: CacheKey, value: ScoredRoute, ttl: Duration) -> Result<(), Error> {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
