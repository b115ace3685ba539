//! Request-level error taxonomy.
//!
//! Every failure a call can produce maps onto exactly one status code. The
//! message returned to the caller is the `Display` form; `Internal` keeps its
//! detail for the log only.

use axum::http::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the dispatch pipeline and the transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not a JSON object.
    #[error("Bad Request")]
    BadRequest,

    /// Token does not match the expected digest.
    #[error("Forbidden")]
    Forbidden,

    /// Path is not routed.
    #[error("Not Found")]
    NotFound,

    /// One or more fields failed validation. Carries the aggregated reason.
    #[error("{0}")]
    InvalidRequest(String),

    /// Anything unexpected, including store retry exhaustion.
    #[error("Internal Server Error")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
