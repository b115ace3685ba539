//! Declarative field validation.
//!
//! # Data Flow
//! ```text
//! raw JSON value (or unset)
//!     → spec.rs (required / absent / emptiness checks)
//!     → kind.rs (per-kind validity rule)
//!     → ValidationResult { is_valid, reason }
//! ```
//!
//! # Design Decisions
//! - Kinds are a closed enum dispatched by `match`, not a trait hierarchy
//! - Emptiness is judged by each kind's own rule, never a generic falsy test
//! - Field specs are `const`-constructible so shapes can be built once

pub mod kind;
pub mod spec;

pub use kind::{parse_date, phone_digits, FieldError, FieldKind, Gender};
pub use spec::{FieldSpec, ValidationResult};
