use moka::Expiry;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
struct Stamped<V> {
    value: V,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
struct PerEntryTtl;

impl<V> Expiry<String, Stamped<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Stamped<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Time-bounded memoization keyed by a normalised query string.
///
/// Keys are trimmed and uppercased, so `"aapl"` and `" AAPL "` share an entry.
/// Concurrent misses on the same key wait on a single computation, which gives
/// at most one upstream call per key per TTL window. The number of entries is
/// bounded; the least valuable entries are evicted once the bound is reached.
#[derive(Clone)]
pub struct QuoteCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, Stamped<V>>,
}

impl<V> QuoteCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self { inner }
    }

    pub fn normalize_key(key: &str) -> String {
        key.trim().to_uppercase()
    }

    /// Returns the cached value for `key`, or runs `compute` and stores its
    /// result for `ttl`. Whatever `compute` returns is stored, fallback values
    /// included.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> V
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = V> + Send,
    {
        let key = Self::normalize_key(key);
        let entry = self
            .inner
            .entry(key.clone())
            .or_insert_with(async move {
                Stamped {
                    value: compute().await,
                    ttl,
                }
            })
            .await;

        if entry.is_fresh() {
            debug!("Cache MISS for key: {}", key);
        } else {
            debug!("Cache HIT for key: {}", key);
        }
        entry.into_value().value
    }

    /// Like [`QuoteCache::get_or_compute`], but an error from `compute` is
    /// handed to every caller waiting on it and nothing is stored.
    pub async fn try_get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<V, Arc<E>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send,
        E: Send + Sync + 'static,
    {
        let key = Self::normalize_key(key);
        let entry = self
            .inner
            .entry(key.clone())
            .or_try_insert_with(async move {
                compute().await.map(|value| Stamped { value, ttl })
            })
            .await
            .inspect_err(|_| debug!("Cache FILL FAILED for key: {}", key))?;

        if entry.is_fresh() {
            debug!("Cache MISS for key: {}", key);
        } else {
            debug!("Cache HIT for key: {}", key);
        }
        Ok(entry.into_value().value)
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
        debug!("Cache CLEAR");
    }

    /// Applies pending evictions and expirations right away.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    const LONG: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn test_second_call_within_ttl_is_cached() {
        let cache = QuoteCache::<i32>::new(100);
        let calls = &AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("AAPL", LONG, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    42
                })
                .await;
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_key_normalization() {
        let cache = QuoteCache::<String>::new(100);
        let calls = &AtomicUsize::new(0);

        for key in ["aapl", "AAPL", "  Aapl\t"] {
            let value = cache
                .get_or_compute(key, LONG, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    "apple".to_string()
                })
                .await;
            assert_eq!(value, "apple");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(QuoteCache::<String>::normalize_key(" msft "), "MSFT");
    }

    #[tokio::test]
    async fn test_recomputes_after_ttl() {
        let cache = QuoteCache::<usize>::new(100);
        let calls = &AtomicUsize::new(0);
        let ttl = Duration::from_millis(50);

        let compute = || async move { calls.fetch_add(1, Ordering::SeqCst) + 1 };

        assert_eq!(cache.get_or_compute("TSLA", ttl, compute).await, 1);
        assert_eq!(cache.get_or_compute("TSLA", ttl, compute).await, 1);

        sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get_or_compute("TSLA", ttl, compute).await, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ttl_is_per_entry() {
        let cache = QuoteCache::<&'static str>::new(100);
        let calls = &AtomicUsize::new(0);
        let compute = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            "v"
        };

        cache
            .get_or_compute("short", Duration::from_millis(30), compute)
            .await;
        cache.get_or_compute("long", LONG, compute).await;
        sleep(Duration::from_millis(100)).await;

        cache
            .get_or_compute("short", Duration::from_millis(30), compute)
            .await;
        cache.get_or_compute("long", LONG, compute).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_coalesced() {
        let cache = Arc::new(QuoteCache::<u32>::new(100));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let key = if i % 2 == 0 { "nvda" } else { "NVDA" };
                tokio::spawn(async move {
                    cache
                        .get_or_compute(key, LONG, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            sleep(Duration::from_millis(50)).await;
                            7
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QuoteCache::<i32>::new(100);
        let calls = &AtomicUsize::new(0);

        let failed = cache
            .try_get_or_compute("GOOG", LONG, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<i32, String>("upstream down".to_string())
            })
            .await;
        assert_eq!(failed.unwrap_err().as_str(), "upstream down");

        for _ in 0..2 {
            let value = cache
                .try_get_or_compute("GOOG", LONG, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<i32, String>(3)
                })
                .await
                .unwrap();
            assert_eq!(value, 3);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_size_is_bounded() {
        let cache = QuoteCache::<usize>::new(10);
        for i in 0..100 {
            cache
                .get_or_compute(&format!("key{i}"), LONG, || async move { i })
                .await;
        }
        cache.run_pending_tasks().await;
        assert!(cache.entry_count() <= 10);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = QuoteCache::<i32>::new(100);
        let calls = &AtomicUsize::new(0);
        let compute = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            1
        };

        cache.get_or_compute("AMZN", LONG, compute).await;
        cache.invalidate_all();
        cache.get_or_compute("AMZN", LONG, compute).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
