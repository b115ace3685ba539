//! Backend seam for the key-value store.
//!
//! A backend hands out sessions; a session reads and writes records. The
//! wire protocol behind either is not this crate's concern.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::store::key::StoreKey;

/// Failure reported by a backend or one of its sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Transport-level failure. The session is presumed dead.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered but refused the operation.
    #[error("{0}")]
    Other(String),
}

/// Opens sessions against the backing store.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Open a fresh session. Called at startup and on every reconnect.
    async fn connect(&self) -> Result<Box<dyn KvSession>, BackendError>;
}

/// One live connection to the store.
#[async_trait]
pub trait KvSession: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    async fn select(&self, key: &StoreKey) -> Result<Option<Value>, BackendError>;

    /// Insert or replace the value under `key`.
    async fn upsert(&self, key: &StoreKey, value: Value) -> Result<(), BackendError>;
}
