use crate::config::SuggestConfig;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use typeahead_protocol::Candidate;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub candidates: Vec<Candidate>,
    pub inserted_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

/// Normalized query -> committed candidate list, bounded by LRU and TTL.
///
/// Clones share one store, so several sessions can reuse each other's
/// lookups. Every write replaces the whole entry under the lock; readers
/// never observe a half-written list.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Mutex<LruCache<String, CacheEntry>>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn from_config(config: &SuggestConfig) -> Self {
        Self::new(config.cache_capacity, config.cache_ttl())
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live entry for `key`, if any. Expired entries are evicted on the way.
    pub fn get(&self, key: &str) -> Option<Vec<Candidate>> {
        let now = Instant::now();
        let mut cache = self.lock();
        let live = cache.peek(key)?.is_live(self.ttl, now);
        if !live {
            log::debug!("Query cache: '{key}' expired");
            cache.pop(key);
            return None;
        }
        cache.get(key).map(|entry| entry.candidates.clone())
    }

    pub fn insert(&self, key: impl Into<String>, candidates: Vec<Candidate>) {
        let key = key.into();
        let entry = CacheEntry {
            key: key.clone(),
            candidates,
            inserted_at: Instant::now(),
        };
        let displaced = self.lock().push(key.clone(), entry);
        if let Some((evicted, _)) = displaced.filter(|(old, _)| *old != key) {
            log::debug!("Query cache: evicted '{evicted}'");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
