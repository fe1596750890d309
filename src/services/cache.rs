// src/services/cache.rs
// DOCUMENTATION: In-memory TTL cache for public catalog listings
// PURPOSE: Serve repeated listing queries without hitting the database

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe cache of serialized listing responses
/// DOCUMENTATION: Admin writes call clear() so edits show up immediately.
/// Every clear() bumps the generation; a listing computed under an older
/// generation is not stored.
pub struct CatalogCache {
    store: Arc<RwLock<HashMap<String, CacheEntry<String>>>>,
    default_ttl: Duration,
    generation: AtomicU64,
}

impl CatalogCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
            generation: AtomicU64::new(0),
        }
    }

    /// Key for a listing: scope plus the query string with its pairs sorted,
    /// so "?a=1&b=2" and "?b=2&a=1" share an entry
    pub fn listing_key(scope: &str, query_string: &str) -> String {
        let mut pairs: Vec<&str> = query_string
            .split('&')
            .filter(|pair| !pair.is_empty())
            .collect();
        pairs.sort_unstable();
        format!("{}?{}", scope, pairs.join("&"))
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                log::debug!("Cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                log::debug!("Cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    /// Current generation; read before computing a value for set_if_generation()
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store `value` only if no clear() happened since `generation` was read.
    /// Returns whether the value was stored.
    pub async fn set_if_generation(&self, key: String, value: String, generation: u64) -> bool {
        let mut store = self.store.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("Cache SKIP for key: {} (cleared while computing)", key);
            return false;
        }
        log::debug!("Cache SET for key: {} (TTL: {}s)", key, self.default_ttl.as_secs());
        store.insert(key, CacheEntry::new(value, self.default_ttl));
        true
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }

    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        let count = store.len();
        store.clear();
        log::info!("Cache cleared: {} entries removed", count);
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<CatalogCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}
