//! Node RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint
//! - Query chain state (chain id, nonces)
//! - Fetch the node's shielding public key
//! - Submit read-only `eth_call`s
//! - Classify transport failures, node rejections and timeouts

use std::future::IntoFuture;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError as TransportRpcError, TransportError, TransportResult};
use tokio::time::timeout;

use crate::blockchain::types::{ChainId, Endpoint, RpcError, RpcResult};
use crate::config::NetworkConfig;
use crate::observability::metrics;

/// JSON-RPC method serving the node's long-term shielding key.
pub const NODE_PUBLIC_KEY_METHOD: &str = "eth_getNodePublicKey";

/// RPC client bound to a single node endpoint.
///
/// No failover and no retries: a failed call surfaces immediately.
#[derive(Clone)]
pub struct NodeClient {
    provider: DynProvider,
    endpoint: Endpoint,
    timeout_duration: Duration,
}

impl NodeClient {
    /// Create a client for `endpoint`. No I/O happens until the first call.
    pub fn connect(endpoint: Endpoint, timeout_duration: Duration) -> Self {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(endpoint.url().clone())
            .erased();

        tracing::debug!(
            endpoint = %endpoint,
            timeout_secs = timeout_duration.as_secs(),
            "Node client created"
        );

        Self {
            provider,
            endpoint,
            timeout_duration,
        }
    }

    /// Create a client from the network section of the configuration.
    pub fn from_config(config: &NetworkConfig) -> RpcResult<Self> {
        let endpoint: Endpoint = config.rpc_url.parse()?;
        Ok(Self::connect(
            endpoint,
            Duration::from_secs(config.rpc_timeout_secs),
        ))
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Run one RPC future under the configured deadline.
    async fn request<F, T>(&self, method: &'static str, fut: F) -> RpcResult<T>
    where
        F: IntoFuture<Output = TransportResult<T>>,
    {
        let started = Instant::now();
        let outcome = timeout(self.timeout_duration, fut).await;
        metrics::record_rpc_duration(method, started.elapsed());

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = classify(method, e);
                tracing::warn!(endpoint = %self.endpoint, error = %err, "RPC call failed");
                Err(err)
            }
            Err(_) => {
                tracing::warn!(endpoint = %self.endpoint, method, "RPC timeout");
                Err(RpcError::Timeout {
                    method,
                    secs: self.timeout_duration.as_secs(),
                })
            }
        }
    }

    /// Get the chain ID reported by the node.
    pub async fn get_chain_id(&self) -> RpcResult<ChainId> {
        self.request("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> RpcResult<u64> {
        self.request(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address),
        )
        .await
    }

    /// Fetch the node's public key used for shielded payloads.
    ///
    /// Returned raw; length and validity are checked by the caller.
    pub async fn node_public_key(&self) -> RpcResult<Bytes> {
        self.request(
            NODE_PUBLIC_KEY_METHOD,
            self.provider
                .raw_request::<_, Bytes>(NODE_PUBLIC_KEY_METHOD.into(), ("latest",)),
        )
        .await
    }

    /// Submit a read-only call and return the raw result bytes.
    pub async fn call(&self, tx: TransactionRequest) -> RpcResult<Bytes> {
        self.request("eth_call", self.provider.call(tx)).await
    }
}

/// Map an alloy transport error onto the node error taxonomy.
fn classify(method: &'static str, err: TransportError) -> RpcError {
    match err {
        TransportRpcError::ErrorResp(payload) => RpcError::Rejected {
            method,
            code: payload.code,
            message: payload.message.to_string(),
        },
        TransportRpcError::DeserError { err, .. } => RpcError::Malformed {
            method,
            message: err.to_string(),
        },
        other => RpcError::Transport {
            method,
            message: other.to_string(),
        },
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("endpoint", &self.endpoint.to_string())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
