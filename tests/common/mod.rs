//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Local;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use scoring_api::config::ScoringConfig;
use scoring_api::dispatch::Dispatcher;
use scoring_api::http::HttpServer;
use scoring_api::lifecycle::Shutdown;
use scoring_api::resilience::RetryPolicy;
use scoring_api::security::Authenticator;
use scoring_api::store::{MemoryBackend, Store};

/// Defaults with a short store retry budget so outage tests finish quickly.
pub fn test_config() -> ScoringConfig {
    let mut config = ScoringConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.store.reconnect_attempts = 2;
    config.store.reconnect_delay_ms = 10;
    config
}

pub fn build_server(backend: &MemoryBackend) -> HttpServer {
    build_server_with(backend, test_config())
}

/// Server over `backend` using `config` as given, without validating it.
pub fn build_server_with(backend: &MemoryBackend, config: ScoringConfig) -> HttpServer {
    let store = Store::new(Arc::new(backend.clone()), RetryPolicy::from(&config.store));
    let dispatcher = Dispatcher::new(Arc::new(store), Authenticator::new(&config.auth));
    HttpServer::new(config, dispatcher)
}

pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Start a server on an ephemeral port over `backend`.
pub async fn start_server(backend: &MemoryBackend) -> TestServer {
    let server = build_server(backend);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, stop).await.unwrap();
    });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Fill in the token a correctly configured client would send.
pub fn signed(mut body: Value) -> Value {
    let auth = Authenticator::default();
    let account = body["account"].as_str().map(str::to_string);
    let login = body["login"].as_str().unwrap_or_default().to_string();
    body["token"] = json!(auth.token_for(account.as_deref(), &login, Local::now().naive_local()));
    body
}

pub fn user_call(method: &str, arguments: Value) -> Value {
    signed(json!({
        "account": "horns&hoofs",
        "login": "h&f",
        "method": method,
        "arguments": arguments,
    }))
}
