//! Cache Store Module
//!
//! Generic key-value cache with absolute and sliding expiration, pattern-based
//! bulk removal and an optional LRU capacity bound.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, EntryOptions, LruTracker, SystemClock};

// == Cache Status ==
/// Whether a read was served from cache or had to be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug)]
struct StoreInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker,
    stats: CacheStats,
}

impl<V> StoreInner<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
        }
    }

    /// Purges every entry that is no longer live at `now`.
    fn purge_dead(&mut self, now: u64) -> usize {
        let dead: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &dead {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(dead.len());
        self.stats.set_total_entries(self.entries.len());
        dead.len()
    }
}

// == Cache Store ==
/// Concurrency-safe TTL cache shared by every request handler.
///
/// Values are opaque: whatever is stored is cloned back out unchanged on a hit.
/// Expired entries are treated as absent whether or not they have been purged;
/// purging happens on access and in [`CacheStore::cleanup_expired`].
///
/// No operation can fail. The only fallible path is the caller-supplied compute
/// function of [`CacheStore::get_or_set`], whose error is returned untouched.
#[derive(Debug)]
pub struct CacheStore<V> {
    inner: RwLock<StoreInner<V>>,
    clock: Arc<dyn Clock>,
    /// `None` means unbounded
    max_entries: Option<usize>,
}

impl<V> Default for CacheStore<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V>
where
    V: Clone + Send + Sync,
{
    // == Constructors ==
    /// Creates an unbounded store on the system clock.
    pub fn new() -> Self {
        Self::with_max_entries(None)
    }

    /// Creates a store that evicts least recently used keys past `max_entries`.
    ///
    /// `None` or `Some(0)` leaves the store unbounded.
    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        Self {
            inner: RwLock::new(StoreInner::new()),
            clock: Arc::new(SystemClock),
            max_entries: max_entries.filter(|max| *max > 0),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Get ==
    /// Returns the live value for `key`, resetting its sliding clock.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let found = inner.entries.get_mut(key).map(|entry| {
            if entry.is_live(now) {
                entry.touch(now);
                Some(entry.value.clone())
            } else {
                None
            }
        });

        match found {
            Some(Some(value)) => {
                inner.stats.record_hit();
                if self.max_entries.is_some() {
                    inner.lru.touch(key);
                }
                debug!(op = "get", key, outcome = "hit");
                Some(value)
            }
            Some(None) => {
                inner.entries.remove(key);
                inner.lru.remove(key);
                inner.stats.record_expirations(1);
                inner.stats.record_miss();
                inner.stats.set_total_entries(inner.entries.len());
                debug!(op = "get", key, outcome = "expired");
                None
            }
            None => {
                inner.stats.record_miss();
                debug!(op = "get", key, outcome = "miss");
                None
            }
        }
    }

    // == Set ==
    /// Inserts or overwrites `key` with an absolute TTL and optional sliding window.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
        sliding: Option<Duration>,
    ) {
        self.set_with(key, value, EntryOptions::new(ttl, sliding)).await;
    }

    /// Inserts or overwrites `key` under the given expiration policy.
    pub async fn set_with(&self, key: impl Into<String>, value: V, options: EntryOptions) {
        let key = key.into();
        let now = self.clock.now_ms();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let is_overwrite = inner.entries.contains_key(&key);

        if let Some(max) = self.max_entries {
            if !is_overwrite && inner.entries.len() >= max {
                // Dead entries make room before any live one is evicted
                inner.purge_dead(now);
            }
            if !is_overwrite && inner.entries.len() >= max {
                if let Some(evicted) = inner.lru.evict_oldest() {
                    inner.entries.remove(&evicted);
                    inner.stats.record_eviction();
                    debug!(op = "evict", key = %evicted, outcome = "evicted");
                }
            }
            inner.lru.touch(&key);
        }

        inner
            .entries
            .insert(key.clone(), CacheEntry::new(value, now, options));
        inner.stats.set_total_entries(inner.entries.len());

        debug!(
            op = "set",
            key = %key,
            ttl_ms = options.ttl.as_millis() as u64,
            sliding = ?options.sliding,
            outcome = if is_overwrite { "overwritten" } else { "inserted" }
        );
    }

    // == Get Or Set ==
    /// Returns the cached value or computes, stores and returns a fresh one.
    ///
    /// The sliding window follows the default policy `min(ttl / 2, 30 minutes)`.
    /// See [`CacheStore::get_or_set_with`] for the concurrency contract.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_set_with(key, EntryOptions::with_default_sliding(ttl), compute)
            .await
            .map(|(value, _)| value)
    }

    /// Like [`CacheStore::get_or_set`] with an explicit policy, also reporting HIT/MISS.
    ///
    /// No lock is held while `compute` runs. Concurrent misses on the same key
    /// may each run their compute function and the last `set` wins, so compute
    /// functions must be safe to repeat. A failed compute stores nothing and its
    /// error is returned as is.
    pub async fn get_or_set_with<F, Fut, E>(
        &self,
        key: &str,
        options: EntryOptions,
        compute: F,
    ) -> Result<(V, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok((value, CacheStatus::Hit));
        }

        let value = compute().await?;
        self.set_with(key, value.clone(), options).await;
        Ok((value, CacheStatus::Miss))
    }

    // == Remove ==
    /// Deletes `key` if present. Returns whether anything was removed.
    pub async fn remove(&self, key: &str) -> bool {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let removed = inner.entries.remove(key).is_some();
        if removed {
            inner.lru.remove(key);
            inner.stats.set_total_entries(inner.entries.len());
        }

        debug!(
            op = "remove",
            key,
            outcome = if removed { "removed" } else { "absent" }
        );
        removed
    }

    // == Remove By Pattern ==
    /// Deletes every key containing `pattern`, compared case-insensitively.
    ///
    /// This is a plain substring test, not a glob or regex. An empty pattern
    /// is contained in every key and therefore clears the store.
    pub async fn remove_by_pattern(&self, pattern: &str) -> usize {
        let needle = pattern.to_lowercase();
        let mut guard = self.inner.write().await;
        let StoreInner {
            entries,
            lru,
            stats,
        } = &mut *guard;

        let before = entries.len();
        entries.retain(|key, _| !key.to_lowercase().contains(&needle));
        let removed = before - entries.len();

        if removed > 0 {
            lru.retain(|key| entries.contains_key(key));
            stats.set_total_entries(entries.len());
        }

        debug!(op = "remove_by_pattern", pattern, removed);
        removed
    }

    // == Exists ==
    /// True iff a live entry is present. Does not count as an access.
    pub async fn exists(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    // == Cleanup Expired ==
    /// Purges all dead entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut inner = self.inner.write().await;
        inner.purge_dead(now)
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    /// Number of physically held entries, dead-but-unpurged included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Keys of all live entries, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let now = self.clock.now_ms();
        let inner = self.inner.read().await;
        let mut keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HOUR: Duration = Duration::from_secs(3600);

    fn store_with_clock() -> (CacheStore<String>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let store = CacheStore::new().with_clock(Arc::new(clock.clone()));
        (store, clock)
    }

    #[tokio::test]
    async fn test_get_unset_key_is_absent() {
        let (store, _) = store_with_clock();

        assert_eq!(store.get("never_set").await, None);
        assert!(!store.exists("never_set").await);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (store, _) = store_with_clock();

        store.set("key1", "value1".to_string(), HOUR, None).await;

        assert_eq!(store.get("key1").await, Some("value1".to_string()));
        assert!(store.exists("key1").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_overwrite_resets_value() {
        let (store, _) = store_with_clock();

        store.set("key1", "value1".to_string(), HOUR, None).await;
        store.set("key1", "value2".to_string(), HOUR, None).await;

        assert_eq!(store.get("key1").await, Some("value2".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_absolute_expiry_without_remove() {
        let (store, clock) = store_with_clock();

        store
            .set("key1", "value1".to_string(), Duration::from_secs(5), None)
            .await;
        clock.advance(Duration::from_secs(5));

        assert!(!store.exists("key1").await);
        assert_eq!(store.get("key1").await, None);
        // expired entry was purged on access
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_inventory_scenario() {
        let clock = ManualClock::new(0);
        let store: CacheStore<Vec<&str>> = CacheStore::new().with_clock(Arc::new(clock.clone()));

        store
            .set(
                "inventory_items",
                vec!["itemA", "itemB"],
                Duration::from_secs(30),
                Some(Duration::from_secs(10)),
            )
            .await;
        assert_eq!(
            store.get("inventory_items").await,
            Some(vec!["itemA", "itemB"])
        );

        clock.advance(Duration::from_secs(31));
        assert_eq!(store.get("inventory_items").await, None);
    }

    #[tokio::test]
    async fn test_sliding_window_refreshed_by_get() {
        let (store, clock) = store_with_clock();

        store
            .set(
                "order_1",
                "o1".to_string(),
                HOUR,
                Some(Duration::from_secs(120)),
            )
            .await;

        for _ in 0..3 {
            clock.advance(Duration::from_secs(100));
            assert!(store.get("order_1").await.is_some());
        }

        clock.advance(Duration::from_secs(120));
        assert_eq!(store.get("order_1").await, None);
    }

    #[tokio::test]
    async fn test_exists_does_not_refresh_sliding_window() {
        let (store, clock) = store_with_clock();

        store
            .set(
                "order_1",
                "o1".to_string(),
                Duration::from_secs(300),
                Some(Duration::from_secs(120)),
            )
            .await;

        clock.advance(Duration::from_secs(100));
        assert!(store.exists("order_1").await);
        clock.advance(Duration::from_secs(30));
        assert!(!store.exists("order_1").await);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop() {
        let (store, _) = store_with_clock();
        store.set("other", "v".to_string(), HOUR, None).await;

        assert!(!store.remove("missing").await);
        assert_eq!(store.get("other").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_remove_existing_key() {
        let (store, _) = store_with_clock();
        store.set("key1", "v".to_string(), HOUR, None).await;

        assert!(store.remove("key1").await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_by_pattern_is_substring_match() {
        let (store, _) = store_with_clock();
        for key in ["order_1", "order_42", "all_orders", "recent_orders", "inventory_items"] {
            store.set(key, key.to_string(), HOUR, None).await;
        }

        let removed = store.remove_by_pattern("order_").await;

        assert_eq!(removed, 2);
        assert_eq!(
            store.keys().await,
            vec!["all_orders", "inventory_items", "recent_orders"]
        );
    }

    #[tokio::test]
    async fn test_remove_by_pattern_is_case_insensitive() {
        let (store, _) = store_with_clock();
        store.set("Order_7", "v".to_string(), HOUR, None).await;
        store.set("ORDER_8", "v".to_string(), HOUR, None).await;

        assert_eq!(store.remove_by_pattern("order_").await, 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_or_set_computes_once_then_hits() {
        let (store, _) = store_with_clock();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<String, ()> = store
                .get_or_set("all_orders", Duration::from_secs(120), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("orders".to_string())
                })
                .await;
            assert_eq!(value, Ok("orders".to_string()));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_set_with_reports_status() {
        let (store, _) = store_with_clock();
        let options = EntryOptions::absolute(HOUR);

        let (_, first) = store
            .get_or_set_with("k", options, || async { Ok::<_, ()>("v".to_string()) })
            .await
            .unwrap();
        let (_, second) = store
            .get_or_set_with("k", options, || async { Ok::<_, ()>("w".to_string()) })
            .await
            .unwrap();

        assert_eq!(first, CacheStatus::Miss);
        assert_eq!(second, CacheStatus::Hit);
    }

    #[tokio::test]
    async fn test_get_or_set_propagates_error_and_stores_nothing() {
        let (store, _) = store_with_clock();

        let result: Result<String, &str> = store
            .get_or_set("order_9", Duration::from_secs(300), || async {
                Err("database unavailable")
            })
            .await;

        assert_eq!(result, Err("database unavailable"));
        assert!(!store.exists("order_9").await);
    }

    #[tokio::test]
    async fn test_get_or_set_uses_default_sliding_policy() {
        let (store, clock) = store_with_clock();

        store
            .get_or_set("k", Duration::from_secs(60), || async {
                Ok::<_, ()>("v".to_string())
            })
            .await
            .unwrap();

        // sliding window is 30s, untouched entry dies before the 60s TTL
        clock.advance(Duration::from_secs(30));
        assert!(!store.exists("k").await);
    }

    #[tokio::test]
    async fn test_concurrent_misses_may_both_compute() {
        let (store, _) = store_with_clock();
        let store = Arc::new(store);
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(tokio::sync::Barrier::new(2));

        let run = |label: &'static str| {
            let store = store.clone();
            let calls = calls.clone();
            let barrier = barrier.clone();
            async move {
                store
                    .get_or_set("order_1", Duration::from_secs(300), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        // both callers are inside compute at once
                        barrier.wait().await;
                        Ok::<_, ()>(label.to_string())
                    })
                    .await
            }
        };

        let (a, b) = tokio::join!(run("computeA"), run("computeB"));

        // Duplicate computation is accepted behaviour, not a bug
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(a, Ok("computeA".to_string()));
        assert_eq!(b, Ok("computeB".to_string()));

        // Whichever set landed last wins
        let stored = store.get("order_1").await.unwrap();
        assert!(stored == "computeA" || stored == "computeB");
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let (store, clock) = store_with_clock();

        store
            .set("short", "v".to_string(), Duration::from_secs(1), None)
            .await;
        store.set("long", "v".to_string(), HOUR, None).await;
        clock.advance(Duration::from_secs(2));

        assert_eq!(store.len().await, 2);
        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.keys().await, vec!["long"]);
        assert_eq!(store.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let (store, clock) = store_with_clock();

        store
            .set("key1", "v".to_string(), Duration::from_secs(1), None)
            .await;
        store.get("key1").await;
        store.get("missing").await;
        clock.advance(Duration::from_secs(1));
        store.get("key1").await;

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_bounded_store_evicts_least_recently_used() {
        let clock = ManualClock::new(0);
        let store: CacheStore<String> =
            CacheStore::with_max_entries(Some(3)).with_clock(Arc::new(clock));

        store.set("key1", "1".to_string(), HOUR, None).await;
        store.set("key2", "2".to_string(), HOUR, None).await;
        store.set("key3", "3".to_string(), HOUR, None).await;
        store.get("key1").await;
        store.set("key4", "4".to_string(), HOUR, None).await;

        assert_eq!(store.len().await, 3);
        assert!(!store.exists("key2").await);
        assert!(store.exists("key1").await);
        assert_eq!(store.stats().await.evictions, 1);
    }

    #[tokio::test]
    async fn test_bounded_store_prefers_purging_dead_entries() {
        let clock = ManualClock::new(0);
        let store: CacheStore<String> =
            CacheStore::with_max_entries(Some(2)).with_clock(Arc::new(clock.clone()));

        store.set("live", "v".to_string(), HOUR, None).await;
        store
            .set("dying", "v".to_string(), Duration::from_secs(1), None)
            .await;
        clock.advance(Duration::from_secs(2));
        store.set("new", "v".to_string(), HOUR, None).await;

        assert_eq!(store.keys().await, vec!["live", "new"]);
        assert_eq!(store.stats().await.evictions, 0);
    }

    #[tokio::test]
    async fn test_zero_max_entries_is_unbounded() {
        let store: CacheStore<u32> = CacheStore::with_max_entries(Some(0));
        for i in 0..10 {
            store.set(format!("order_{i}"), i, HOUR, None).await;
        }
        assert_eq!(store.len().await, 10);
    }
}
