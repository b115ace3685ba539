//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject empty secrets
//! - Keep the request timeout longer than the store retry budget
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ScoringConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ScoringConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    BadAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error(
        "timeouts.request_secs ({timeout_ms} ms) must exceed store retry budget ({budget_ms} ms)"
    )]
    TimeoutWithinRetryBudget { timeout_ms: u64, budget_ms: u64 },
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn validate_config(config: &ScoringConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    } else {
        let timeout_ms = config.timeouts.request_secs.saturating_mul(1000);
        let budget_ms = u64::from(config.store.reconnect_attempts)
            .saturating_mul(config.store.reconnect_delay_ms);
        if timeout_ms <= budget_ms {
            errors.push(ValidationError::TimeoutWithinRetryBudget {
                timeout_ms,
                budget_ms,
            });
        }
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.auth.admin_login.is_empty() {
        errors.push(ValidationError::Empty("auth.admin_login"));
    }
    if config.auth.admin_secret.is_empty() {
        errors.push(ValidationError::Empty("auth.admin_secret"));
    }
    if config.auth.salt.is_empty() {
        errors.push(ValidationError::Empty("auth.salt"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
