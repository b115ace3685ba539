//! Scoring API library.

// Core pipeline
pub mod dispatch;
pub mod fields;
pub mod requests;
pub mod scoring;
pub mod store;

// Transport
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::ScoringConfig;
pub use dispatch::Dispatcher;
pub use error::ApiError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
