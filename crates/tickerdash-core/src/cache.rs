//! Time-bounded memoization of fetch outcomes.
//!
//! Entries are keyed by `(symbol, period)` and remember when they were
//! fetched; every lookup checks that timestamp against the current TTL.
//! Failed fetches are memoized too, so a bad symbol is not re-queried until
//! the entry expires.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{DataUnavailable, Period, PriceSeries, Symbol};

/// Result of one provider fetch as stored in the cache.
pub type FetchResult = Result<Arc<PriceSeries>, DataUnavailable>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: Symbol,
    pub period: Period,
}

impl CacheKey {
    pub fn new(symbol: Symbol, period: Period) -> Self {
        Self { symbol, period }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    result: FetchResult,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.fetched_at) < self.ttl
    }

    fn get(&self, key: &CacheKey) -> Option<FetchResult> {
        let now = Instant::now();
        self.map
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.result.clone())
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.map
            .retain(|_, entry| now.saturating_duration_since(entry.fetched_at) < ttl);
    }
}

/// Thread-safe price cache shared by every fetch of a process.
#[derive(Debug, Clone)]
pub struct PriceCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl PriceCache {
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    /// A cache that never holds anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns the memoized outcome for `key` if it is younger than the TTL.
    pub async fn get(&self, key: &CacheKey) -> Option<FetchResult> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Stores an outcome stamped with the current instant. No-op when the
    /// TTL is zero.
    pub async fn put(&self, key: CacheKey, result: FetchResult) {
        let mut store = self.inner.write().await;
        if store.ttl.is_zero() {
            return;
        }

        store.map.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                result,
            },
        );
    }

    pub async fn ttl(&self) -> Duration {
        self.inner.read().await.ttl
    }

    /// Changes the TTL; existing entries are judged against the new value.
    pub async fn set_ttl(&self, ttl: Duration) {
        self.inner.write().await.ttl = ttl;
    }

    /// Remove expired entries from the cache.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.map.is_empty()
    }
}
