//! Runtime Cache Module
//!
//! Memoizing cache facade combining HashMap storage with TTL expiration and
//! get-or-compute semantics.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, CachedValue, MAX_KEY_LENGTH};
use crate::error::{PreviewError, Result};

// == Inner State ==
/// Shared state behind the cloneable cache handle.
struct CacheInner {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Memoization statistics
    stats: Mutex<CacheStats>,
    /// Per-key gates collapsing duplicate concurrent async computations
    in_flight: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

// == Runtime Cache ==
/// Process-wide memoizing cache with per-entry TTL.
///
/// The cache stores type-erased values so heterogeneous call sites share one
/// store; a lookup downcasts to the caller's type. Cloning the handle is
/// cheap and all clones share the same entries.
///
/// The handle is explicitly owned and injected, never a hidden singleton, so
/// each test can construct an isolated store.
#[derive(Clone)]
pub struct RuntimeCache {
    inner: Arc<CacheInner>,
}

impl RuntimeCache {
    // == Constructor ==
    /// Creates a new, empty runtime cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                stats: Mutex::new(CacheStats::new()),
                in_flight: AsyncMutex::new(HashMap::new()),
            }),
        }
    }

    // == Get Or Compute ==
    /// Returns the memoized value for `key`, invoking `compute` on a miss.
    ///
    /// On a miss the computed value is stored with expiration `now + ttl`,
    /// overwriting any stale entry for that key. A failing `compute`
    /// propagates to the caller and stores nothing, so the next call invokes
    /// `compute` again. `T = Option<_>` makes absence a cacheable value.
    ///
    /// Two concurrent misses on the same key may both invoke `compute`, the
    /// second write winning; callers must tolerate duplicate computation.
    /// The async variant collapses that race, see [`Self::get_or_compute_async`].
    ///
    /// # Errors
    /// Returns `PreviewError::InvalidKey` for an empty or oversized key, or
    /// whatever error `compute` produced.
    pub fn get_or_compute<T, F>(&self, key: &str, ttl: Duration, compute: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T>,
    {
        validate_key(key)?;

        if let Some(value) = self.lookup::<T>(key) {
            self.record_hit(key);
            return Ok(value);
        }

        self.record_miss(key);

        // Failed computations are never cached
        let value = compute()?;
        self.insert(key, Arc::new(value.clone()), ttl);

        Ok(value)
    }

    // == Get Or Compute (async) ==
    /// Async variant of [`Self::get_or_compute`] with single-flight misses.
    ///
    /// The contract is identical, except that concurrent misses on the same
    /// key queue behind a per-key gate: one caller runs `compute` while the
    /// rest wait and are served the freshly stored value. If the winning
    /// computation fails, waiters re-run `compute` themselves.
    pub async fn get_or_compute_async<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        validate_key(key)?;

        if let Some(value) = self.lookup::<T>(key) {
            self.record_hit(key);
            return Ok(value);
        }

        // Take the per-key gate without holding the map lock across awaits
        let gate = {
            let mut in_flight = self.inner.in_flight.lock().await;
            in_flight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let _guard = gate.lock().await;

        // Another flight may have filled the entry while we waited
        if let Some(value) = self.lookup::<T>(key) {
            self.record_hit(key);
            return Ok(value);
        }

        self.record_miss(key);

        let computed = compute().await;

        // Only the computing party removes the gate, after the entry is
        // written (or the failure decided), so queued waiters re-check the
        // cache rather than spawning fresh flights mid-compute.
        match computed {
            Ok(value) => {
                self.insert(key, Arc::new(value.clone()), ttl);
                self.remove_gate(key).await;
                Ok(value)
            }
            Err(err) => {
                self.remove_gate(key).await;
                Err(err)
            }
        }
    }

    // == Remove ==
    /// Removes an entry by key.
    ///
    /// Returns `true` if the key existed, regardless of expiration.
    pub fn remove(&self, key: &str) -> bool {
        let (removed, total) = {
            let mut entries = self.inner.entries.write();
            (entries.remove(key).is_some(), entries.len())
        };
        self.inner.stats.lock().set_total_entries(total);
        removed
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed. Expired entries are also
    /// removed lazily when a lookup touches them.
    pub fn cleanup_expired(&self) -> usize {
        let (removed, total) = {
            let mut entries = self.inner.entries.write();
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired());
            (before - entries.len(), entries.len())
        };
        self.inner.stats.lock().set_total_entries(total);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.inner.stats.lock().clone();
        stats.set_total_entries(self.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones
    /// awaiting sweep.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    // == Lookup ==
    /// Returns the unexpired value for `key` if it downcasts to `T`.
    ///
    /// Expired entries are removed on the way out. A type mismatch counts as
    /// a miss; the caller's write will overwrite the foreign value.
    fn lookup<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
        let entry = self.inner.entries.read().get(key).cloned()?;

        if entry.is_expired() {
            let total = {
                let mut entries = self.inner.entries.write();
                // Re-check under the write lock in case a refresh won the race
                if entries.get(key).is_some_and(|e| e.is_expired()) {
                    entries.remove(key);
                }
                entries.len()
            };
            self.inner.stats.lock().set_total_entries(total);
            return None;
        }

        entry.downcast::<T>()
    }

    // == Insert ==
    /// Stores a value with expiration `now + ttl`, overwriting any previous
    /// entry for the key.
    fn insert(&self, key: &str, value: CachedValue, ttl: Duration) {
        let total = {
            let mut entries = self.inner.entries.write();
            entries.insert(key.to_string(), CacheEntry::new(value, ttl));
            entries.len()
        };
        self.inner.stats.lock().set_total_entries(total);
    }

    /// Drops the in-flight gate for `key` once its computation settled.
    async fn remove_gate(&self, key: &str) {
        self.inner.in_flight.lock().await.remove(key);
    }

    fn record_hit(&self, key: &str) {
        debug!(key, "cache hit");
        self.inner.stats.lock().record_hit();
    }

    fn record_miss(&self, key: &str) {
        debug!(key, "cache miss");
        self.inner.stats.lock().record_miss();
    }
}

impl Default for RuntimeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuntimeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeCache")
            .field("entries", &self.len())
            .finish()
    }
}

// == Key Validation ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(PreviewError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(PreviewError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;

    const TTL: Duration = Duration::from_secs(30);

    #[test]
    fn test_miss_computes_and_stores() {
        let cache = RuntimeCache::new();

        let value = cache
            .get_or_compute("key1", TTL, || Ok("value1".to_string()))
            .unwrap();

        assert_eq!(value, "value1");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hit_skips_compute() {
        let cache = RuntimeCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("key1", TTL, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("value1".to_string())
                })
                .unwrap();
            assert_eq!(value, "value1");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_entry_recomputed() {
        let cache = RuntimeCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_millis(20);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(calls.load(Ordering::SeqCst))
        };

        assert_eq!(cache.get_or_compute("key1", ttl, compute).unwrap(), 1);

        sleep(Duration::from_millis(40));

        // Expired entry is logically absent: compute runs again and the
        // expiration is refreshed
        assert_eq!(cache.get_or_compute("key1", ttl, compute).unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_compute_not_cached() {
        let cache = RuntimeCache::new();
        let calls = AtomicUsize::new(0);

        let result: Result<String> = cache.get_or_compute("key1", TTL, || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PreviewError::Routing("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());

        // Next call invokes compute again rather than returning a cached failure
        let value = cache
            .get_or_compute("key1", TTL, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("recovered".to_string())
            })
            .unwrap();

        assert_eq!(value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_absence_is_cacheable() {
        let cache = RuntimeCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Option<String> = cache
                .get_or_compute("key1", TTL, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .unwrap();
            assert!(value.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1, "None should be served from cache");
    }

    #[test]
    fn test_type_mismatch_counts_as_miss() {
        let cache = RuntimeCache::new();

        cache
            .get_or_compute("key1", TTL, || Ok("string".to_string()))
            .unwrap();

        // Same key, different type: recomputed and overwritten
        let value: i32 = cache.get_or_compute("key1", TTL, || Ok(7)).unwrap();
        assert_eq!(value, 7);

        // The overwrite replaced the string
        let value: i32 = cache.get_or_compute("key1", TTL, || Ok(99)).unwrap();
        assert_eq!(value, 7);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let cache = RuntimeCache::new();

        let result: Result<String> = cache.get_or_compute("", TTL, || Ok("v".to_string()));
        assert!(matches!(result, Err(PreviewError::InvalidKey(_))));
    }

    #[test]
    fn test_key_too_long_rejected() {
        let cache = RuntimeCache::new();
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        let result: Result<String> = cache.get_or_compute(&long_key, TTL, || Ok("v".to_string()));
        assert!(matches!(result, Err(PreviewError::InvalidKey(_))));
    }

    #[test]
    fn test_remove() {
        let cache = RuntimeCache::new();

        cache
            .get_or_compute("key1", TTL, || Ok("value1".to_string()))
            .unwrap();

        assert!(cache.remove("key1"));
        assert!(cache.is_empty());
        assert!(!cache.remove("key1"));
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = RuntimeCache::new();

        cache
            .get_or_compute("short", Duration::from_millis(10), || Ok(1u32))
            .unwrap();
        cache.get_or_compute("long", TTL, || Ok(2u32)).unwrap();

        sleep(Duration::from_millis(30));

        let removed = cache.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let cache = RuntimeCache::new();

        cache.get_or_compute("key1", TTL, || Ok(1u32)).unwrap(); // miss
        cache.get_or_compute("key1", TTL, || Ok(1u32)).unwrap(); // hit
        cache.get_or_compute("key2", TTL, || Ok(2u32)).unwrap(); // miss

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.total_entries, 2);
    }

    #[test]
    fn test_clone_shares_entries() {
        let cache1 = RuntimeCache::new();
        let cache2 = cache1.clone();

        cache1
            .get_or_compute("key1", TTL, || Ok("value1".to_string()))
            .unwrap();

        let calls = AtomicUsize::new(0);
        let value = cache2
            .get_or_compute("key1", TTL, || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("other".to_string())
            })
            .unwrap();

        assert_eq!(value, "value1");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_async_miss_computes_and_stores() {
        let cache = RuntimeCache::new();

        let value = cache
            .get_or_compute_async("key1", TTL, || async { Ok("value1".to_string()) })
            .await
            .unwrap();

        assert_eq!(value, "value1");

        // The sync path sees the same entry
        let value = cache
            .get_or_compute("key1", TTL, || Ok("other".to_string()))
            .unwrap();
        assert_eq!(value, "value1");
    }

    #[tokio::test]
    async fn test_async_failed_compute_not_cached() {
        let cache = RuntimeCache::new();

        let result: Result<String> = cache
            .get_or_compute_async("key1", TTL, || async {
                Err(PreviewError::Routing("boom".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_async_single_flight() {
        let cache = RuntimeCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute_async("contested", TTL, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok("value".to_string())
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "value");
        }

        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "concurrent misses should collapse into one computation"
        );
    }
}
