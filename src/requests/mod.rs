//! Request shapes.
//!
//! # Data Flow
//! ```text
//! raw JSON object
//!     → shape.rs (bind to a RequestShape → RequestInstance)
//!     → RequestInstance::validate (every field, aggregated)
//!     → RequestArgs::cross_validate (only after the base pass)
//!     → RequestArgs::from_instance (typed struct for handlers)
//! ```
//!
//! # Design Decisions
//! - Shapes are built once, in declaration order, and never mutated
//! - Unknown keys are ignored; unset keys stay distinct from explicit nulls
//! - Typed conversion only runs on instances that passed validation

pub mod clients_interests;
pub mod envelope;
pub mod online_score;
pub mod shape;

pub use clients_interests::ClientsInterestsArgs;
pub use envelope::MethodRequest;
pub use online_score::OnlineScoreArgs;
pub use shape::{
    RequestInstance, RequestShape, ShapeBuilder, INVALID_FIELDS_PREFIX, REASON_SEPARATOR,
};

use crate::fields::ValidationResult;

/// A request type backed by a static shape.
pub trait RequestArgs: Sized {
    fn shape() -> &'static RequestShape;

    /// Rules spanning several fields. Runs only when every field is valid.
    fn cross_validate(_instance: &RequestInstance<'_>) -> ValidationResult {
        ValidationResult::valid()
    }

    /// Build the typed value. Only meaningful after [`RequestArgs::validate`] passed.
    fn from_instance(instance: &RequestInstance<'_>) -> Self;

    fn validate(instance: &RequestInstance<'_>) -> ValidationResult {
        let base = instance.validate();
        if !base.is_valid {
            return base;
        }
        Self::cross_validate(instance)
    }
}
