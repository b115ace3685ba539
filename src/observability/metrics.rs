//! Metrics collection and exposition.
//!
//! # Metrics
//! - `scoring_requests_total` (counter): requests by method, response code
//! - `scoring_request_duration_seconds` (histogram): latency by method
//! - `scoring_store_retries_total` (counter): store reconnect attempts
//! - `scoring_cache_hits_total` / `scoring_cache_misses_total` (counters)
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(method: &str, code: u16, start: Instant) {
    ::metrics::counter!(
        "scoring_requests_total",
        "method" => method.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
    ::metrics::histogram!("scoring_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_store_retry() {
    ::metrics::counter!("scoring_store_retries_total").increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    if hit {
        ::metrics::counter!("scoring_cache_hits_total").increment(1);
    } else {
        ::metrics::counter!("scoring_cache_misses_total").increment(1);
    }
}
