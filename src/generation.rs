//! Atomically swappable handle on the current [`PathCache`].
//!
//! A reload builds a complete new cache, then publishes it with
//! [`Generations::replace`]. Readers holding an `Arc` from [`Generations::current`]
//! keep a consistent view of their generation until they ask again.

use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use crate::path_cache::PathCache;

#[derive(Debug)]
pub struct Generations {
    current: RwLock<(u64, Arc<PathCache>)>,
}

impl Generations {
    pub fn new(cache: PathCache) -> Self {
        Generations {
            current: RwLock::new((0, Arc::new(cache))),
        }
    }

    pub fn current(&self) -> Arc<PathCache> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard.1)
    }

    /// Number of the current generation, starting at 0.
    pub fn generation(&self) -> u64 {
        self.current.read().unwrap_or_else(PoisonError::into_inner).0
    }

    /// Publish a freshly loaded cache and return its generation number.
    pub fn replace(&self, cache: PathCache) -> u64 {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = guard.0 + 1;
        *guard = (next, Arc::new(cache));
        info!("generation {next} published ({} bodies)", guard.1.len());
        next
    }
}

impl Default for Generations {
    fn default() -> Self {
        Self::new(PathCache::new())
    }
}
