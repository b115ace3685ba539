//! Key-value store subsystem.
//!
//! # Data Flow
//! ```text
//! get(key):
//!     → key.rs (parse "uid:" / "i:" addressing)
//!     → adapter.rs (select on the live session)
//!     → network failure? fixed delay, reconnect, repeat within budget
//!     → JSON text, or StoreError::Connection once the budget is spent
//!
//! cache_get(key) / cache_set(key, value, minutes):
//!     → adapter.rs TTL index (key → valid-thru instant)
//!     → failures degrade to a miss / `false`, never an error
//! ```
//!
//! # Design Decisions
//! - Backends sit behind `KvBackend`/`KvSession` so tests can simulate outages
//! - Reconnects are serialized; concurrent failures share one new session

pub mod adapter;
pub mod backend;
pub mod error;
pub mod key;
pub mod memory;

pub use adapter::Store;
pub use backend::{BackendError, KvBackend, KvSession};
pub use error::StoreError;
pub use key::{RecordId, Space, StoreKey};
pub use memory::MemoryBackend;
