//! Chain-specific types and error definitions.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// A node JSON-RPC endpoint.
///
/// Equality is on the normalised URL, so `http://Node:8545` and
/// `http://node:8545/` name the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    /// The underlying URL.
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl FromStr for Endpoint {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(s).map_err(|e| RpcError::InvalidUrl {
            url: s.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(RpcError::InvalidUrl {
                url: s.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from talking to a node.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Endpoint URL could not be parsed.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network failure before a JSON-RPC response arrived.
    #[error("RPC error calling {method}: {message}")]
    Transport { method: &'static str, message: String },

    /// The node answered with a JSON-RPC error object.
    #[error("Node rejected {method} (code {code}): {message}")]
    Rejected {
        method: &'static str,
        code: i64,
        message: String,
    },

    /// The node answered, but not with the expected shape.
    #[error("Malformed {method} response: {message}")]
    Malformed { method: &'static str, message: String },

    /// RPC request timed out.
    #[error("RPC timeout after {secs} seconds calling {method}")]
    Timeout { method: &'static str, secs: u64 },
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Errors while building a wallet identity.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Invalid private key format or derivation error.
    #[error("Invalid private key format: {0}")]
    InvalidPrivateKey(String),

    /// No key in the environment and no fallback address given.
    #[error("Environment variable {0} not set")]
    MissingEnv(&'static str),
}
