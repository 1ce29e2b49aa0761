//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the query tool.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Chain identifier of the shielded network the tool targets by default.
pub const DEFAULT_CHAIN_ID: u64 = 1291;

/// Gas limit attached to every shielded read call.
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Root configuration for the query tool.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct QueryConfig {
    /// Node endpoint and call parameters.
    pub network: NetworkConfig,

    /// Token contract being queried.
    pub token: TokenConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL of the node.
    pub rpc_url: String,

    /// Chain ID written into every call request.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas limit for read calls.
    pub gas_limit: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            rpc_timeout_secs: 10,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

/// Token contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Address of the deployed token contract.
    pub contract_address: String,

    /// Decimals used when formatting the balance.
    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            decimals: 18,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
