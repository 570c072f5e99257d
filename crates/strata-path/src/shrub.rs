use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use strata_types::Location;
use tracing::debug;

use crate::route::Route;

/// Configuration for the route resolution cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrubConfig {
    /// Maximum number of cached routes. Zero is treated as one.
    pub capacity: usize,
}

impl Default for ShrubConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Bounded LRU cache of route to location resolutions.
pub struct Shrub {
    cache: Mutex<LruCache<Route, Location>>,
}

impl Shrub {
    pub fn new(config: &ShrubConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, route: &Route) -> Option<Location> {
        self.cache
            .lock()
            .expect("shrub lock poisoned")
            .get(route)
            .copied()
    }

    pub fn put(&self, route: Route, location: Location) {
        self.cache
            .lock()
            .expect("shrub lock poisoned")
            .put(route, location);
    }

    /// Drop `route` and every cached route beneath it. Returns the count.
    pub fn evict(&self, route: &Route) -> usize {
        let mut cache = self.cache.lock().expect("shrub lock poisoned");
        let stale: Vec<Route> = cache
            .iter()
            .filter(|(cached, _)| cached.derives(route))
            .map(|(cached, _)| cached.clone())
            .collect();
        for cached in &stale {
            cache.pop(cached);
        }
        if !stale.is_empty() {
            debug!(route = %route, evicted = stale.len(), "evicted cached routes");
        }
        stale.len()
    }

    pub fn clear(&self) {
        self.cache.lock().expect("shrub lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().expect("shrub lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Shrub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shrub").field("len", &self.len()).finish()
    }
}
