//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Store operation:
//!     → backend call fails
//!     → retries.rs (is it retryable? is there budget left?)
//!     → fixed delay, reconnect, try again
//! ```
//!
//! # Design Decisions
//! - Retry decisions live here; the store owns the loop
//! - Cache reads never retry: a failed read is a miss

pub mod retries;

pub use retries::{is_retryable, RetryPolicy};
