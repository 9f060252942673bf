//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Returns every error found, not
//! just the first, and runs before any network activity begins.

use std::fmt;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.ledger.watched_address.trim().is_empty() {
        errors.push(ValidationError::new(
            "ledger.watched_address",
            "missing (set WALLET_ADDRESS or ledger.watched_address)",
        ));
    }

    if let Err(e) = url::Url::parse(&config.ledger.gateway_url) {
        errors.push(ValidationError::new(
            "ledger.gateway_url",
            format!("invalid URL '{}': {}", config.ledger.gateway_url, e),
        ));
    }

    if config.ledger.request_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.request_timeout_secs", "must be > 0"));
    }

    if config.ledger.page_size == 0 {
        errors.push(ValidationError::new("ledger.page_size", "must be > 0"));
    }

    if config.poll.interval_secs == 0 {
        errors.push(ValidationError::new("poll.interval_secs", "must be > 0"));
    }

    if config.poll.fetch_deadline_secs == 0 {
        errors.push(ValidationError::new("poll.fetch_deadline_secs", "must be > 0"));
    }

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("invalid socket address '{}'", config.listener.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
