//! Store adapter: reads with reconnect-and-retry, plus a TTL cache.
//!
//! The live session sits in an `ArcSwapOption` so readers never lock. A
//! reconnect holds `reconnect_lock`; a caller that waited on the lock and finds
//! a newer session generation than the one that failed uses it instead of
//! reconnecting again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::observability::metrics;
use crate::resilience::{is_retryable, RetryPolicy};
use crate::store::backend::{BackendError, KvBackend, KvSession};
use crate::store::key::StoreKey;
use crate::store::StoreError;

struct Session {
    generation: u64,
    conn: Box<dyn KvSession>,
}

enum Op {
    Select,
    Upsert(Value),
}

/// Shared handle to the backing store.
pub struct Store {
    backend: Arc<dyn KvBackend>,
    policy: RetryPolicy,
    session: ArcSwapOption<Session>,
    reconnect_lock: Mutex<()>,
    generations: AtomicU64,
    cache_valid_thru: DashMap<String, Instant>,
}

impl Store {
    /// Create a store without connecting. The first operation connects.
    pub fn new(backend: Arc<dyn KvBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            session: ArcSwapOption::empty(),
            reconnect_lock: Mutex::new(()),
            generations: AtomicU64::new(0),
            cache_valid_thru: DashMap::new(),
        }
    }

    /// Try to open a session now. Failure is logged, not fatal.
    pub async fn connect(&self) -> bool {
        let current = self.current_generation();
        self.reconnect(current).await
    }

    /// JSON-encoded value under `key`; a missing record encodes as `null`.
    ///
    /// Network failures trigger up to `policy.attempts` reconnects, each after
    /// `policy.delay`. Exhausting the budget yields [`StoreError::Connection`].
    pub async fn get(&self, key: &str) -> Result<String, StoreError> {
        let parsed = StoreKey::parse(key)?;
        let value = self.execute(&parsed, Op::Select).await?;
        Ok(value.unwrap_or(Value::Null).to_string())
    }

    /// Cached value under `key`, or `None` when absent, expired, or unreadable.
    pub async fn cache_get(&self, key: &str) -> Option<Value> {
        let value = self.read_cache(key).await;
        metrics::record_cache_lookup(value.is_some());
        value
    }

    async fn read_cache(&self, key: &str) -> Option<Value> {
        let parsed = StoreKey::parse(key).ok()?;
        let valid_thru = *self.cache_valid_thru.get(key)?;
        if valid_thru <= Instant::now() {
            self.cache_valid_thru.remove(key);
            return None;
        }

        let session = self.session.load_full()?;
        match session.conn.select(&parsed).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error reading from cache");
                None
            }
        }
    }

    /// Best-effort write kept for `minutes`. Returns whether it landed.
    ///
    /// A successful write also drops every expired entry from the TTL index.
    pub async fn cache_set(&self, key: &str, value: Value, minutes: u64) -> bool {
        let parsed = match StoreKey::parse(key) {
            Ok(k) => k,
            Err(e) => {
                tracing::warn!(error = %e, "Error saving to cache");
                return false;
            }
        };

        match self.execute(&parsed, Op::Upsert(value)).await {
            Ok(_) => {
                let now = Instant::now();
                self.cache_valid_thru.retain(|_, valid_thru| *valid_thru > now);
                let ttl = Duration::from_secs(minutes.saturating_mul(60));
                self.cache_valid_thru.insert(key.to_string(), now + ttl);
                true
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Error saving to cache");
                false
            }
        }
    }

    async fn execute(&self, key: &StoreKey, op: Op) -> Result<Option<Value>, StoreError> {
        let mut attempt = 0;
        loop {
            let (generation, result) = match self.session.load_full() {
                Some(session) => {
                    let result = match &op {
                        Op::Select => session.conn.select(key).await,
                        Op::Upsert(value) => {
                            session.conn.upsert(key, value.clone()).await.map(|()| None)
                        }
                    };
                    (session.generation, result)
                }
                None => (0, Err(BackendError::Network("not connected".to_string()))),
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) => e,
                Err(e) => return Err(StoreError::Backend(e.to_string())),
            };

            loop {
                attempt += 1;
                if !self.policy.allows(attempt) {
                    return Err(StoreError::Connection {
                        attempts: self.policy.attempts,
                        reason: err.to_string(),
                    });
                }
                tracing::info!(
                    key = %key,
                    error = %err,
                    attempt,
                    of = self.policy.attempts,
                    delay = ?self.policy.delay,
                    "Store connection error, reconnecting"
                );
                metrics::record_store_retry();
                tokio::time::sleep(self.policy.delay).await;
                if self.reconnect(generation).await {
                    break;
                }
            }
        }
    }

    fn current_generation(&self) -> u64 {
        self.session.load_full().map_or(0, |s| s.generation)
    }

    /// Replace the session that failed at `failed_generation`.
    async fn reconnect(&self, failed_generation: u64) -> bool {
        let _guard = self.reconnect_lock.lock().await;
        if self.current_generation() != failed_generation {
            return true;
        }

        tracing::info!("Connecting to store...");
        match self.backend.connect().await {
            Ok(conn) => {
                let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
                self.session.store(Some(Arc::new(Session { generation, conn })));
                tracing::info!(generation, "Store connected");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Store connection error");
                false
            }
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("policy", &self.policy)
            .field("generation", &self.current_generation())
            .field("cached_keys", &self.cache_valid_thru.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use serde_json::json;

    fn store_with(backend: &MemoryBackend, attempts: u32) -> Store {
        Store::new(
            Arc::new(backend.clone()),
            RetryPolicy::new(attempts, Duration::from_millis(100)),
        )
    }

    #[tokio::test]
    async fn test_get_encodes_json() {
        let backend = MemoryBackend::new();
        backend.insert_interests(2, &["sport", "cars"]);
        let store = store_with(&backend, 3);

        assert_eq!(store.get("i:2").await.unwrap(), r#"["sport","cars"]"#);
        assert_eq!(store.get("i:3").await.unwrap(), "null");
    }

    #[tokio::test]
    async fn test_get_rejects_bad_keys() {
        let store = store_with(&MemoryBackend::new(), 3);
        assert!(matches!(store.get("x:1").await, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_exhausts_retry_budget() {
        let backend = MemoryBackend::new();
        backend.set_available(false);
        let store = store_with(&backend, 3);

        let started = Instant::now();
        let err = store.get("i:1").await.unwrap_err();
        assert!(matches!(err, StoreError::Connection { attempts: 3, .. }));
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_recovers_after_outage() {
        let backend = MemoryBackend::new();
        backend.insert_interests(1, &["books"]);
        let store = store_with(&backend, 5);
        assert!(store.connect().await);

        backend.set_available(false);
        let flip = backend.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            flip.set_available(true);
        });

        assert_eq!(store.get("i:1").await.unwrap(), r#"["books"]"#);
        assert_eq!(backend.connect_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_failures_reconnect_once() {
        let backend = MemoryBackend::new();
        backend.insert_interests(1, &["tv"]);
        let store = Arc::new(store_with(&backend, 5));
        assert!(store.connect().await);

        backend.set_available(false);
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move { store.get("i:1").await }));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        backend.set_available(true);

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(backend.connect_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_entries_expire() {
        let backend = MemoryBackend::new();
        let store = store_with(&backend, 1);

        assert_eq!(store.cache_get("uid:k").await, None);
        assert!(store.cache_set("uid:k", json!(3.0), 1).await);
        assert_eq!(store.cache_get("uid:k").await, Some(json!(3.0)));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.cache_get("uid:k").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_set_sweeps_expired_entries() {
        let backend = MemoryBackend::new();
        let store = store_with(&backend, 1);

        assert!(store.cache_set("uid:a", json!(1.0), 1).await);
        assert!(store.cache_set("uid:b", json!(2.0), 5).await);
        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(store.cache_set("uid:c", json!(3.0), 1).await);
        assert_eq!(store.cache_valid_thru.len(), 2);
        assert!(!store.cache_valid_thru.contains_key("uid:a"));
        assert_eq!(store.cache_get("uid:b").await, Some(json!(2.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_failures_degrade_silently() {
        let backend = MemoryBackend::new();
        let store = store_with(&backend, 2);
        assert!(store.cache_set("i:42", json!(["42"]), 1).await);

        backend.set_available(false);
        assert_eq!(store.cache_get("i:42").await, None);

        let started = Instant::now();
        assert!(!store.cache_set("i:42", json!(["43"]), 1).await);
        assert_eq!(started.elapsed(), Duration::from_millis(200));
        assert!(!store.cache_set("bogus", json!(1), 1).await);
    }
}
