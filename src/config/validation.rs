//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! reported together, not just the first.

use alloy::primitives::Address;
use std::fmt;

use crate::config::schema::QueryConfig;

/// Largest decimals value whose scale factor still fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &QueryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.network.rpc_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "network.rpc_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "network.rpc_url",
            format!("invalid URL '{}': {}", config.network.rpc_url, e),
        )),
    }

    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "network.rpc_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.network.gas_limit == 0 {
        errors.push(ValidationError::new(
            "network.gas_limit",
            "must be greater than zero",
        ));
    }

    if !config.token.contract_address.is_empty()
        && config.token.contract_address.parse::<Address>().is_err()
    {
        errors.push(ValidationError::new(
            "token.contract_address",
            format!("invalid address '{}'", config.token.contract_address),
        ));
    }

    if config.token.decimals > MAX_DECIMALS {
        errors.push(ValidationError::new(
            "token.decimals",
            format!("must be at most {}", MAX_DECIMALS),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
