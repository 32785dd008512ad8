use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// Cached upstream response with its absolute expiry
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// In-memory TTL cache for upstream responses.
///
/// Values are stored as JSON so one cache serves every endpoint shape.
/// Expiry is re-checked on every read; the background sweep only reclaims
/// memory and is not required for correctness. Not shared across processes.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Look up a key, treating expired entries as misses
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;

        if Instant::now() >= entry.expires_at {
            return None;
        }

        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Store a value with its own time-to-live
    pub fn insert<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop all expired entries
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Periodically evict expired entries in the background
    pub fn spawn_sweeper(&self, period: Duration) {
        let cache = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                cache.purge_expired();
                debug!("Cache sweep complete, {} entries live", cache.len());
            }
        });
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
