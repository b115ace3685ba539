//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router around the single `method` endpoint
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Keep middleware rejections inside the JSON envelope
//! - Decode the body and hand it to the dispatcher
//! - Log and count every call
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Method as Verb, Request, StatusCode},
    middleware::map_response,
    response::Response,
    Router,
};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ScoringConfig;
use crate::dispatch::{Context, DispatchOutcome, Dispatcher, Method};
use crate::error::ApiError;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response;
use crate::observability::metrics;

/// Path segment served, after stripping slashes.
pub const API_PATH: &str = "method";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the scoring API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: ScoringConfig, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ScoringConfig, state: AppState) -> Router {
        Router::new()
            .fallback(api_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(map_response(envelope_layer_rejections))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight calls.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Rewrite bare rejections from the limit and timeout layers into envelopes.
async fn envelope_layer_rejections(res: Response) -> Response {
    match res.status() {
        StatusCode::REQUEST_TIMEOUT => {
            tracing::warn!("Request timed out");
            response::failure(&ApiError::Internal("request timed out".to_string()))
        }
        StatusCode::PAYLOAD_TOO_LARGE => response::failure(&ApiError::BadRequest),
        _ => res,
    }
}

async fn api_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .request_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let path = request.uri().path().to_string();
    let verb = request.method().clone();

    if verb != Verb::POST {
        return finish(Context::new(request_id), Err(ApiError::NotFound), "none", start_time);
    }

    let mut label = "none";
    let outcome = match read_body(request.into_body()).await {
        Ok(bytes) => {
            tracing::info!(
                request_id = %request_id,
                path = %path,
                body = %String::from_utf8_lossy(&bytes),
                "Request received"
            );
            match parse_body(&bytes) {
                Ok(_) if path.trim_matches('/') != API_PATH => {
                    rejected(request_id, ApiError::NotFound)
                }
                Ok(body) => {
                    label = method_label(&body);
                    state.dispatcher.dispatch(&request_id, &body).await
                }
                Err(e) => rejected(request_id, e),
            }
        }
        Err(e) => rejected(request_id, e),
    };

    finish(outcome.context, outcome.result, label, start_time)
}

fn rejected(request_id: String, err: ApiError) -> DispatchOutcome {
    DispatchOutcome {
        context: Context::new(request_id),
        result: Err(err),
    }
}

fn finish(
    context: Context,
    result: Result<Value, ApiError>,
    method: &str,
    start_time: Instant,
) -> Response {
    let code = match &result {
        Ok(_) => 200,
        Err(e) => e.code(),
    };
    tracing::info!(
        request_id = %context.request_id,
        has = ?context.has,
        nclients = ?context.nclients,
        code,
        "Request completed"
    );
    metrics::record_request(method, code, start_time);
    response::from_result(result)
}

async fn read_body(body: Body) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read request body");
        ApiError::BadRequest
    })
}

/// Decode the body. Whitespace only reads as an empty object.
fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|_| ApiError::BadRequest)
}

// Metric label: only registered method names, to bound cardinality.
fn method_label(body: &Value) -> &'static str {
    body.get("method")
        .and_then(Value::as_str)
        .and_then(Method::parse)
        .map_or("none", Method::name)
}
