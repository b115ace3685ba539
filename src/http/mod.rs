//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, body decoding)
//!     → request.rs (honour or assign the request ID)
//!     → dispatch (envelope → auth → method → handler)
//!     → response.rs (JSON envelope, status = code)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer, API_PATH};
