//! Request ID propagation.
//!
//! # Responsibilities
//! - Honour an incoming `X-Request-ID`, or generate one (UUID v4, simple form)
//! - Expose it to handlers through request extensions
//! - Echo it on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An empty or non-ASCII header counts as absent

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request, Response};
use tower::{Layer, Service};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_headers<B>(request: &Request<B>) -> Option<Self> {
        request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| Self(s.to_string()))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access to the request ID assigned by [`RequestIdLayer`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B, ResBody> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let id = RequestId::from_headers(&request).unwrap_or_else(RequestId::generate);
        let header = HeaderValue::from_str(id.as_str()).ok();
        if let Some(value) = &header {
            request.headers_mut().insert(X_REQUEST_ID, value.clone());
        }
        request.extensions_mut().insert(id);

        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            if let Some(value) = header {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    async fn echo(request: Request<Body>) -> Result<Response<Body>, Infallible> {
        let id = request.request_id().map(|id| id.to_string()).unwrap_or_default();
        Ok(Response::new(Body::from(id)))
    }

    #[tokio::test]
    async fn test_incoming_id_is_kept() {
        let svc = RequestIdLayer.layer(service_fn(echo));
        let request = Request::builder()
            .header(X_REQUEST_ID, "abc123")
            .body(Body::empty())
            .unwrap();

        let response = svc.oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc123");
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"abc123");
    }

    #[tokio::test]
    async fn test_missing_id_is_generated() {
        let svc = RequestIdLayer.layer(service_fn(echo));
        let response = svc.oneshot(Request::new(Body::empty())).await.unwrap();

        let id = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
