//! In-memory response cache for hot list endpoints.
//!
//! One utility replaces the original client's per-hook caches and its
//! in-flight request map: entries expire after a TTL, the cache is bounded
//! by evicting the oldest-inserted key, and concurrent identical misses
//! share a single fetch through a per-key async lock.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct CacheEntry {
    inserted_at: Instant,
    value: serde_json::Value,
}

struct Entries {
    map: HashMap<String, CacheEntry>,
    // Insertion order; front is the oldest key and the next eviction victim.
    order: VecDeque<String>,
}

pub struct QueryCache {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<Entries>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl QueryCache {
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry; expired entries are dropped on access.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.map.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.map.remove(key);
            entries.order.retain(|k| k != key);
        }
        None
    }

    /// Insert a value, evicting the oldest key when at capacity.
    pub async fn insert(&self, key: String, value: serde_json::Value) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.lock().await;
        if entries.map.remove(&key).is_some() {
            entries.order.retain(|k| k != &key);
        }
        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
        }
        entries.order.push_back(key.clone());
        entries.map.insert(
            key,
            CacheEntry {
                inserted_at: Instant::now(),
                value,
            },
        );
    }

    /// Drop every entry. Write handlers call this rather than tracking which
    /// keys a mutation could affect.
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.lock().await;
        entries.map.clear();
        entries.order.clear();
    }

    /// Fetch-through lookup with request de-duplication.
    ///
    /// On a miss, the caller acquires a per-key lock before fetching; a
    /// concurrent identical request waits on that lock and then finds the
    /// freshly inserted value instead of issuing its own fetch.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error; nothing is cached on failure.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<serde_json::Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let gate = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(key.to_owned())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let guard = gate.lock().await;

        // A concurrent holder of the gate may have filled the cache while we
        // waited; re-check before fetching.
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let result = fetch().await;
        if let Ok(ref value) = result {
            self.insert(key.to_owned(), value.clone()).await;
        }

        drop(guard);
        self.inflight.lock().await.remove(key);

        result
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn get_returns_inserted_value_until_ttl() {
        let cache = QueryCache::new(Duration::from_millis(30), 8);
        cache.insert("k".to_string(), json!({"n": 1})).await;

        assert_eq!(cache.get("k").await, Some(json!({"n": 1})));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("k").await, None, "entry should expire");
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_key() {
        let cache = QueryCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), json!(1)).await;
        cache.insert("b".to_string(), json!(2)).await;
        cache.insert("c".to_string(), json!(3)).await;

        assert_eq!(cache.get("a").await, None, "oldest key should be evicted");
        assert_eq!(cache.get("b").await, Some(json!(2)));
        assert_eq!(cache.get("c").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn reinsert_refreshes_position_and_value() {
        let cache = QueryCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), json!(1)).await;
        cache.insert("b".to_string(), json!(2)).await;
        cache.insert("a".to_string(), json!(10)).await;
        cache.insert("c".to_string(), json!(3)).await;

        // "b" is now the oldest; "a" was refreshed.
        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.get("a").await, Some(json!(10)));
    }

    #[tokio::test]
    async fn invalidate_all_clears_everything() {
        let cache = QueryCache::new(Duration::from_secs(60), 8);
        cache.insert("a".to_string(), json!(1)).await;
        cache.invalidate_all().await;
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn zero_capacity_disables_caching() {
        let cache = QueryCache::new(Duration::from_secs(60), 0);
        cache.insert("a".to_string(), json!(1)).await;
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn concurrent_identical_misses_share_one_fetch() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60), 8));
        let fetches = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let fetches = Arc::clone(&fetches);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("same-key", || async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, Infallible>(json!({"data": []}))
                    })
                    .await
                    .expect("fetch is infallible")
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.expect("task"), json!({"data": []}));
        }
        assert_eq!(
            fetches.load(Ordering::SeqCst),
            1,
            "all concurrent misses should share one fetch"
        );
    }

    #[tokio::test]
    async fn fetch_error_is_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60), 8);
        let result: Result<serde_json::Value, &str> =
            cache.get_or_fetch("k", || async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));
        assert_eq!(cache.get("k").await, None);
    }
}
