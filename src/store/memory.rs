//! In-process backend.
//!
//! Backs the development server and the test suite. Availability can be
//! toggled to simulate a store outage: while unavailable, `connect` fails and
//! every live session reports network errors.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::store::backend::{BackendError, KvBackend, KvSession};
use crate::store::key::StoreKey;

/// Interest catalogue used for sample data.
pub const SAMPLE_INTERESTS: [&str; 11] = [
    "cars", "pets", "travel", "hi-tech", "sport", "music", "books", "tv", "cinema", "geek", "otus",
];

#[derive(Debug)]
struct MemoryState {
    records: DashMap<StoreKey, Value>,
    available: AtomicBool,
    connects: AtomicU32,
}

#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Arc<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(MemoryState {
                records: DashMap::new(),
                available: AtomicBool::new(true),
                connects: AtomicU32::new(0),
            }),
        }
    }

    /// Seed two deterministic interests for each client id in `0..count`.
    pub fn with_sample_interests(count: i64) -> Self {
        let backend = Self::new();
        let n = SAMPLE_INTERESTS.len();
        for id in 0..count {
            let first = (id.unsigned_abs() as usize) % n;
            let second = (first + 1 + (id.unsigned_abs() as usize / n) % (n - 1)) % n;
            backend.insert_interests(id, &[SAMPLE_INTERESTS[first], SAMPLE_INTERESTS[second]]);
        }
        backend
    }

    pub fn insert_interests(&self, client_id: i64, interests: &[&str]) {
        self.state
            .records
            .insert(StoreKey::interests(client_id), Value::from(interests.to_vec()));
    }

    pub fn insert(&self, key: StoreKey, value: Value) {
        self.state.records.insert(key, value);
    }

    /// Read a record directly, bypassing availability.
    pub fn peek(&self, key: &StoreKey) -> Option<Value> {
        self.state.records.get(key).map(|r| r.value().clone())
    }

    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    /// Successful `connect` calls so far.
    pub fn connect_count(&self) -> u32 {
        self.state.connects.load(Ordering::SeqCst)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn connect(&self) -> Result<Box<dyn KvSession>, BackendError> {
        if !self.state.available.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection refused".to_string()));
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            state: self.state.clone(),
        }))
    }
}

struct MemorySession {
    state: Arc<MemoryState>,
}

impl MemorySession {
    fn ensure_available(&self) -> Result<(), BackendError> {
        if self.state.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Network("connection reset by peer".to_string()))
        }
    }
}

#[async_trait]
impl KvSession for MemorySession {
    async fn select(&self, key: &StoreKey) -> Result<Option<Value>, BackendError> {
        self.ensure_available()?;
        Ok(self.state.records.get(key).map(|r| r.value().clone()))
    }

    async fn upsert(&self, key: &StoreKey, value: Value) -> Result<(), BackendError> {
        self.ensure_available()?;
        self.state.records.insert(key.clone(), value);
        Ok(())
    }
}
