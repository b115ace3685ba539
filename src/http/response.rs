//! Response envelopes.
//!
//! Success: `{"response": payload, "code": 200}`. Failure:
//! `{"error": message, "code": N}`. The HTTP status always equals `code`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

use crate::error::ApiError;

pub fn success(payload: Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "response": payload, "code": StatusCode::OK.as_u16() })),
    )
        .into_response()
}

pub fn failure(err: &ApiError) -> Response {
    (
        err.status(),
        Json(json!({ "error": err.to_string(), "code": err.code() })),
    )
        .into_response()
}

pub fn from_result(result: Result<Value, ApiError>) -> Response {
    match result {
        Ok(payload) => success(payload),
        Err(err) => failure(&err),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        failure(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 16).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = success(json!({"score": 3.0}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, json!({"response": {"score": 3.0}, "code": 200}));
    }

    #[tokio::test]
    async fn test_failure_hides_internal_detail() {
        let response = ApiError::Internal("store down".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(response).await,
            json!({"error": "Internal Server Error", "code": 500})
        );
    }
}
