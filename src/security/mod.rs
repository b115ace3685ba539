//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Validated envelope:
//!     → auth.rs (recompute the expected digest, compare with the token)
//!     → Dispatch continues, or 403
//! ```
//!
//! # Design Decisions
//! - Fail closed: any mismatch is a 403 with no detail
//! - Request size is bounded by the transport's body limit layer

pub mod auth;

pub use auth::Authenticator;
