use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::TokensResult;

struct CacheEntry {
    result: TokensResult,
    stored: Instant,
}

/// Short-lived cache of full pipeline results, keyed by the normalized query
/// parameters. Stale entries are evicted lazily on lookup; there is no
/// background sweep and no capacity bound.
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Freshness check and eviction happen under one write lock, so a reader
    /// never observes a half-replaced entry.
    pub fn get(&self, key: &str) -> Option<TokensResult> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.stored.elapsed() <= self.ttl => Some(entry.result.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, result: TokensResult) {
        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            CacheEntry {
                result,
                stored: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
