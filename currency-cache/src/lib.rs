//! Cache-Aside Store
//!
//! A keyed, in-memory read-through cache. On a miss the caller-supplied
//! producer runs, its value is stored with a time-to-live, and later reads
//! are served from memory until the entry expires.
//!
//! The store is type-erased: one instance can hold raw JSON strings under one
//! key and structured records under another. Values are cloned out on every
//! hit, so cheap-to-clone types (or `Arc`s) work best.
//!
//! # Guarantees
//! - A hit never invokes the producer.
//! - A failed production stores nothing; the error is returned unchanged.
//! - Empty successes (`""`, `None`) are cached like any other value unless
//!   the caller opts out with [`CacheAside::get_or_compute_if`].
//! - Expired entries are dropped lazily, on the next lookup of their key.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use currency_cache::CacheAside;
//!
//! # async fn demo() -> Result<(), std::io::Error> {
//! let cache = CacheAside::new();
//! let rates: String = cache
//!     .get_or_compute("GetLatestExchangeRates_EUR", Duration::from_secs(60), || async {
//!         Ok::<_, std::io::Error>(r#"{"base":"EUR"}"#.to_string())
//!     })
//!     .await?;
//! assert_eq!(rates, r#"{"base":"EUR"}"#);
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

// ─────────────────────────────────────────────────────────────────────────────
// Cache Entry
// ─────────────────────────────────────────────────────────────────────────────

type CachedValue = Arc<dyn Any + Send + Sync>;

struct CacheEntry {
    value: CachedValue,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Flight Slot
// ─────────────────────────────────────────────────────────────────────────────

type InFlightMap = DashMap<String, Arc<Mutex<()>>>;

/// One caller's share of a key's production lock.
///
/// Dropping it (on completion or cancellation) removes the key's lock from
/// the map once no other caller holds it.
struct InFlightSlot<'a> {
    map: &'a InFlightMap,
    key: &'a str,
    lock: Option<Arc<Mutex<()>>>,
}

impl<'a> InFlightSlot<'a> {
    fn join(map: &'a InFlightMap, key: &'a str) -> Self {
        let lock = Arc::clone(&map.entry(key.to_owned()).or_default());
        Self {
            map,
            key,
            lock: Some(lock),
        }
    }

    fn lock(&self) -> &Mutex<()> {
        self.lock.as_deref().unwrap_or_else(|| unreachable!("slot lock taken before drop"))
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.lock.take();
        self.map
            .remove_if(self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache-Aside Store
// ─────────────────────────────────────────────────────────────────────────────

/// Shared read-through cache keyed by string.
///
/// Construct one per process and hand it (behind an `Arc`) to whatever needs
/// it. Lookups on different keys never contend beyond `DashMap` sharding, and
/// no map lock is held while a producer runs.
#[derive(Default)]
pub struct CacheAside {
    entries: DashMap<String, CacheEntry>,
    /// Per-key production locks, present only in single-flight mode.
    in_flight: Option<InFlightMap>,
}

impl CacheAside {
    /// Creates an empty store.
    ///
    /// Concurrent misses on the same key each run their own producer and the
    /// last write wins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that de-duplicates concurrent misses.
    ///
    /// While one caller is producing the value for a key, other callers for
    /// that key wait and then read the freshly stored value instead of
    /// producing again. If the first production fails or is not stored, the
    /// next waiter produces in turn.
    pub fn with_single_flight() -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: Some(DashMap::new()),
        }
    }

    /// Returns true if concurrent misses share one production.
    pub fn is_single_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of stored entries, including expired ones not yet looked up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached value for `key`, or produces, stores and returns it.
    ///
    /// A zero `ttl` disables storing: the produced value is returned but the
    /// next call produces again.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        produce: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_compute_if(key, ttl, produce, |_| true).await
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but a produced value is
    /// only stored when `should_store` accepts it.
    ///
    /// Rejected values are still returned to the caller.
    pub async fn get_or_compute_if<T, E, F, Fut, S>(
        &self,
        key: &str,
        ttl: Duration,
        produce: F,
        should_store: S,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: FnOnce(&T) -> bool,
    {
        if let Some(value) = self.lookup::<T>(key) {
            tracing::trace!(key, "cache hit");
            return Ok(value);
        }

        let Some(in_flight) = &self.in_flight else {
            return self.produce_and_store(key, ttl, produce, should_store).await;
        };

        let slot = InFlightSlot::join(in_flight, key);
        let _guard = slot.lock().lock().await;
        // Another caller may have stored the value while we waited.
        match self.lookup::<T>(key) {
            Some(value) => {
                tracing::trace!(key, "cache hit after waiting for in-flight production");
                Ok(value)
            }
            None => self.produce_and_store(key, ttl, produce, should_store).await,
        }
    }

    /// Returns a live value of type `T` for `key`, dropping it if expired.
    fn lookup<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + 'static,
    {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                // A value of another type under the same key counts as a miss
                // and is overwritten by the next store.
                return entry.value.downcast_ref::<T>().cloned();
            }
        }
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            tracing::trace!(key, "evicted expired entry");
        }
        None
    }

    async fn produce_and_store<T, E, F, Fut, S>(
        &self,
        key: &str,
        ttl: Duration,
        produce: F,
        should_store: S,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: FnOnce(&T) -> bool,
    {
        tracing::debug!(key, "cache miss, producing value");
        let value = produce().await?;

        if ttl.is_zero() || !should_store(&value) {
            return Ok(value);
        }

        match Instant::now().checked_add(ttl) {
            Some(expires_at) => {
                self.entries.insert(
                    key.to_owned(),
                    CacheEntry {
                        value: Arc::new(value.clone()),
                        expires_at,
                    },
                );
            }
            None => tracing::warn!(key, ?ttl, "ttl out of range, value not cached"),
        }
        Ok(value)
    }
}

impl std::fmt::Debug for CacheAside {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAside")
            .field("entries", &self.entries.len())
            .field("single_flight", &self.is_single_flight())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("upstream down")]
    struct UpstreamDown;

    /// Producer that counts its invocations and returns `value`.
    async fn counted<T>(calls: &AtomicUsize, value: T) -> Result<T, UpstreamDown> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_does_not_produce_again() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute("k", TTL, || counted(&calls, "v1".to_string()))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = cache
            .get_or_compute("k", TTL, || counted(&calls, "v2".to_string()))
            .await
            .unwrap();

        assert_eq!(first, "v1");
        assert_eq!(second, "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_produces_again() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_compute("k", TTL, || counted(&calls, 1u32))
            .await
            .unwrap();
        tokio::time::advance(TTL + Duration::from_millis(1)).await;
        let refreshed = cache
            .get_or_compute("k", TTL, || counted(&calls, 2u32))
            .await
            .unwrap();

        assert_eq!(refreshed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_production_is_not_cached() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        let err = cache
            .get_or_compute::<String, _, _, _>("k", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(UpstreamDown)
            })
            .await
            .unwrap_err();
        assert_eq!(err, UpstreamDown);
        assert!(cache.is_empty());

        let value = cache
            .get_or_compute("k", TTL, || counted(&calls, "ok".to_string()))
            .await
            .unwrap();
        assert_eq!(value, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_success_is_cached() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("empty", TTL, || counted(&calls, String::new()))
                .await
                .unwrap();
            assert!(value.is_empty());
        }
        for _ in 0..3 {
            let value = cache
                .get_or_compute("absent", TTL, || counted(&calls, None::<u32>))
                .await
                .unwrap();
            assert!(value.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_caches() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        for i in 0..3u32 {
            let value = cache
                .get_or_compute("k", Duration::ZERO, || counted(&calls, i))
                .await
                .unwrap();
            assert_eq!(value, i);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_value_is_returned_but_not_stored() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute_if(
                    "k",
                    TTL,
                    || counted(&calls, String::new()),
                    |v: &String| !v.is_empty(),
                )
                .await
                .unwrap();
            assert_eq!(value, "");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        let a = cache
            .get_or_compute("a", TTL, || counted(&calls, "A".to_string()))
            .await
            .unwrap();
        let b = cache
            .get_or_compute("b", TTL, || counted(&calls, "B".to_string()))
            .await
            .unwrap();

        assert_eq!((a.as_str(), b.as_str()), ("A", "B"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_miss() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_compute("k", TTL, || counted(&calls, "text".to_string()))
            .await
            .unwrap();
        let number = cache
            .get_or_compute("k", TTL, || counted(&calls, 7u64))
            .await
            .unwrap();

        assert_eq!(number, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_both_produce_by_default() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        // Producer for `value` that takes `value` seconds.
        let slow = move |value: u32| {
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(value.into())).await;
                Ok::<_, UpstreamDown>(value)
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_compute("k", TTL, slow(1)),
            cache.get_or_compute("k", TTL, slow(2)),
        );

        assert_eq!((a.unwrap(), b.unwrap()), (1, 2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // Later write wins.
        let cached = cache
            .get_or_compute("k", TTL, || counted(&calls, 0u32))
            .await
            .unwrap();
        assert_eq!(cached, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_shares_one_production() {
        let cache = CacheAside::with_single_flight();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let slow = move |value: u32| {
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, UpstreamDown>(value)
            }
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_compute("k", TTL, slow(1)),
            cache.get_or_compute("k", TTL, slow(2)),
            cache.get_or_compute("k", TTL, slow(3)),
        );

        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert!(a == b && b == c, "all callers see the single produced value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.in_flight.as_ref().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_single_flight_releases_lock() {
        let cache = CacheAside::with_single_flight();

        for i in 0..100 {
            let key = format!("k{}", i);
            let result = tokio::time::timeout(
                Duration::from_millis(1),
                cache.get_or_compute(&key, TTL, || async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok::<_, UpstreamDown>(1u32)
                }),
            )
            .await;
            assert!(result.is_err());
        }

        assert!(cache.in_flight.as_ref().unwrap().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_waiter_keeps_lock_for_producer() {
        let cache = CacheAside::with_single_flight();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let slow = move |value: u32| {
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, UpstreamDown>(value)
            }
        };

        let (held, waiter) = tokio::join!(
            cache.get_or_compute("k", TTL, slow(1)),
            tokio::time::timeout(
                Duration::from_millis(100),
                cache.get_or_compute("k", TTL, slow(2)),
            ),
        );

        assert!(waiter.is_err());
        assert_eq!(held.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.in_flight.as_ref().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_flight_retries_after_failure() {
        let cache = CacheAside::with_single_flight();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_compute::<u32, _, _, _>("k", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(UpstreamDown)
            })
            .await;
        let second = cache
            .get_or_compute("k", TTL, || counted(&calls, 5u32))
            .await;

        assert!(first.is_err());
        assert_eq!(second.unwrap(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
