use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// In-memory cache keyed by coin id with a fixed TTL
///
/// An entry is served while its age is strictly below the TTL.
pub struct TtlCache<V> {
    ttl: Duration,
    max_size: usize,
    entries: Arc<RwLock<HashMap<String, CachedValue<V>>>>,
}

#[derive(Debug, Clone)]
struct CachedValue<V> {
    value: V,
    cached_at: DateTime<Utc>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a new cache
    pub fn new(ttl: std::time::Duration, max_size: usize) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(120)),
            max_size: max_size.max(1),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a fresh value
    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now()).await
    }

    /// Get a value that is fresh at `now`
    pub async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.read().await;
        let cached = entries.get(key)?;

        let age = now - cached.cached_at;
        if age >= self.ttl {
            debug!("Cache entry for {} expired (age: {:?})", key, age);
            return None;
        }

        Some(cached.value.clone())
    }

    /// Store a value
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Utc::now()).await;
    }

    /// Store a value as if cached at `now`
    ///
    /// Entries already expired at `now` are pruned first; if the cache is still
    /// full, the oldest entries make room.
    pub async fn insert_at(&self, key: impl Into<String>, value: V, now: DateTime<Utc>) {
        let key = key.into();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, cached| now - cached.cached_at < ttl);
        let expired = before - entries.len();
        if expired > 0 {
            debug!("Pruned {} expired cache entries", expired);
        }

        if entries.len() >= self.max_size && !entries.contains_key(&key) {
            let mut by_age: Vec<_> = entries.iter().map(|(k, v)| (k.clone(), v.cached_at)).collect();
            by_age.sort_by_key(|(_, cached_at)| *cached_at);

            let to_remove = entries.len() - self.max_size + 1;
            for (old_key, _) in by_age.iter().take(to_remove) {
                entries.remove(old_key);
            }

            info!("Cache size limit reached, removed {} old entries", to_remove);
        }

        entries.insert(key, CachedValue { value, cached_at: now });
    }
}
