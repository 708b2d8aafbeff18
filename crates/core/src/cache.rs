//! Process-wide memoizing cache with per-entry TTL.
//!
//! One [`MemoCache`] is built at startup and shared through application
//! state. Entries expire lazily: an expired entry is treated as a miss and is
//! only replaced when the same key is next computed. There is no sweep and no
//! invalidation when the underlying data changes, so a reader may see data up
//! to one TTL old.
//!
//! Entries are never removed, only overwritten. The map therefore holds one
//! entry per distinct key ever computed for the life of the process, so its
//! size is bounded by the number of distinct request shapes clients send
//! (every `offset`, `limit` and filter combination is its own key).
//! [`MemoCache::stats`] reports the current entry count.
//!
//! [`MemoCache::remember`] does not deduplicate concurrent misses. Callers
//! that miss on the same key before the first supplier finishes each run
//! their own supplier; the last one to finish wins the slot. The suppliers
//! used here are read-only queries, so the duplicate work is harmless.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;

/// Time source for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. For tests.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        self.start + *elapsed
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

/// Hit/miss counters and current entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct MemoCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the value for `key` if present and unexpired.
    pub async fn get(&self, key: &str) -> Option<Arc<V>> {
        let now = self.clock.now();
        let found = self
            .entries
            .read()
            .await
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| Arc::clone(&entry.value));

        match found {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub async fn set(&self, key: &str, value: V, ttl: Duration) -> Arc<V> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            expires_at: self.clock.now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        value
    }

    /// Return the cached value, or run `supplier`, cache its result and
    /// return it.
    ///
    /// Errors from `supplier` are returned as-is and nothing is cached. No
    /// lock is held while `supplier` runs.
    pub async fn remember<F, Fut, E>(&self, key: &str, ttl: Duration, supplier: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            tracing::trace!(key, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(key, ttl_secs = ttl.as_secs(), "Cache miss, computing value");
        let value = supplier().await?;
        Ok(self.set(key, value, ttl).await)
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use tokio::sync::Barrier;

    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn cache_with_clock() -> (MemoCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (MemoCache::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn get_on_empty_cache_is_a_miss() {
        let cache: MemoCache<String> = MemoCache::new();
        assert!(cache.get("k").await.is_none());
        assert_eq!(
            cache.stats().await,
            CacheStats {
                hits: 0,
                misses: 1,
                entries: 0
            }
        );
    }

    #[tokio::test]
    async fn remember_runs_supplier_once_within_ttl() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let supplier = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>("first".to_string())
        };
        let a = cache.remember("k", TTL, supplier).await.unwrap();

        clock.advance(Duration::from_secs(59));
        let b = cache
            .remember("k", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>("second".to_string())
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*a, "first");
        assert_eq!(*b, "first");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn expired_entry_is_recomputed_on_next_request() {
        let (cache, clock) = cache_with_clock();
        cache.set("k", "old".to_string(), TTL).await;

        clock.advance(TTL);
        assert!(cache.get("k").await.is_none());
        // Lazy expiry: the stale entry stays until replaced.
        assert_eq!(cache.len().await, 1);

        let fresh = cache
            .remember("k", TTL, || async { Ok::<_, ()>("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(*fresh, "new");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn every_distinct_key_stays_resident_after_expiry() {
        let (cache, clock) = cache_with_clock();
        for offset in 0..5 {
            let key = format!("ranking:player:offset={offset}");
            cache.set(&key, "page".to_string(), TTL).await;
        }

        clock.advance(TTL * 10);
        assert!(cache.get("ranking:player:offset=0").await.is_none());

        assert_eq!(cache.stats().await.entries, 5);
    }

    #[tokio::test]
    async fn supplier_errors_are_not_cached() {
        let (cache, _clock) = cache_with_clock();

        let err = cache
            .remember("k", TTL, || async { Err::<String, _>("db down") })
            .await
            .unwrap_err();
        assert_eq!(err, "db down");
        assert!(cache.is_empty().await);

        let ok = cache
            .remember("k", TTL, || async { Ok::<_, &str>("ok".to_string()) })
            .await
            .unwrap();
        assert_eq!(*ok, "ok");
    }

    #[tokio::test]
    async fn distinct_keys_do_not_collide() {
        let (cache, _clock) = cache_with_clock();
        cache.set("a", "A".to_string(), TTL).await;
        cache.set("b", "B".to_string(), TTL).await;

        assert_eq!(*cache.get("a").await.unwrap(), "A");
        assert_eq!(*cache.get("b").await.unwrap(), "B");
    }

    #[tokio::test]
    async fn concurrent_misses_each_run_their_supplier() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);
        // Both suppliers must be in flight at once to pass the barrier, which
        // only happens when misses are not deduplicated.
        let barrier = Barrier::new(2);

        let slow = |label: &'static str| {
            let calls = &calls;
            let barrier = &barrier;
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                barrier.wait().await;
                Ok::<_, ()>(label.to_string())
            }
        };

        let both = async {
            tokio::join!(
                cache.remember("k", TTL, slow("one")),
                cache.remember("k", TTL, slow("two")),
            )
        };
        let (a, b) = tokio::time::timeout(Duration::from_secs(5), both)
            .await
            .expect("suppliers deadlocked");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*a.unwrap(), "one");
        assert_eq!(*b.unwrap(), "two");
        assert_eq!(cache.len().await, 1);
    }
}
