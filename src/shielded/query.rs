//! The shielded query pipeline.
//!
//! # Flow
//! ```text
//! wallet has provider?          no → MissingProvider (no I/O)
//!     → cipher.encrypt          (fresh ephemeral key)
//!     → eth_chainId, nonce      (network info for the log)
//!     → eth_call                (encrypted data, zero gas price)
//!     → cipher.decrypt          (consumes the same ephemeral key)
//!     → ABI decode
//! ```
//!
//! Each query owns its key from `encrypt` to `decrypt`. Nothing is cached
//! between queries and nothing is retried.

use std::time::Duration;

use alloy::primitives::{Address, Bytes};

use crate::blockchain::types::Endpoint;
use crate::blockchain::wallet::Wallet;
use crate::config::{NetworkConfig, MAX_DECIMALS};
use crate::observability::metrics;
use crate::shielded::abi;
use crate::shielded::cipher::{NodeKeyCipher, ShieldCipher};
use crate::shielded::types::{CallRequest, DecodeError, QueryError, TokenBalance};

/// Client that runs shielded read calls against one configured node.
#[derive(Debug, Clone)]
pub struct ShieldedQuery<C = NodeKeyCipher> {
    network: NetworkConfig,
    endpoint: Endpoint,
    cipher: C,
}

impl ShieldedQuery<NodeKeyCipher> {
    /// Build a client using the node-key scheme.
    pub fn new(network: NetworkConfig) -> Result<Self, QueryError> {
        let cipher = NodeKeyCipher::new(Duration::from_secs(network.rpc_timeout_secs));
        Self::with_cipher(network, cipher)
    }
}

impl<C: ShieldCipher> ShieldedQuery<C> {
    /// Build a client with a caller-supplied cipher.
    pub fn with_cipher(network: NetworkConfig, cipher: C) -> Result<Self, QueryError> {
        let endpoint: Endpoint = network.rpc_url.parse()?;
        Ok(Self {
            network,
            endpoint,
            cipher,
        })
    }

    /// The node endpoint every query is encrypted for.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Run one shielded call and return the decrypted result bytes.
    pub async fn send(
        &self,
        wallet: &Wallet,
        destination: Address,
        data: Bytes,
    ) -> Result<Vec<u8>, QueryError> {
        let result = self.send_inner(wallet, destination, data).await;
        metrics::record_query_outcome(if result.is_ok() { "ok" } else { "error" });
        result
    }

    async fn send_inner(
        &self,
        wallet: &Wallet,
        destination: Address,
        data: Bytes,
    ) -> Result<Vec<u8>, QueryError> {
        let provider = wallet.provider().ok_or(QueryError::MissingProvider)?;
        if provider.endpoint() != &self.endpoint {
            return Err(QueryError::ProviderMismatch {
                provider: provider.endpoint().to_string(),
                configured: self.endpoint.to_string(),
            });
        }

        let (encrypted, ephemeral_key) = self
            .cipher
            .encrypt(&self.endpoint, &data)
            .await?
            .into_parts();

        let chain_id = provider.get_chain_id().await?;
        if chain_id.0 != self.network.chain_id {
            tracing::warn!(
                expected = self.network.chain_id,
                actual = chain_id.0,
                "Node reports a different chain ID than configured"
            );
        }
        let nonce = provider.get_transaction_count(wallet.address()).await?;

        tracing::info!(
            endpoint = %self.endpoint,
            chain_id = chain_id.0,
            caller = %wallet.address(),
            nonce,
            "Connected network"
        );

        let request = CallRequest::read_only(
            destination,
            encrypted,
            nonce,
            self.network.chain_id,
            self.network.gas_limit,
        );
        let response = provider.call(request.to_transaction_request()).await?;

        tracing::debug!(
            destination = %destination,
            response_len = response.len(),
            "Shielded call answered"
        );

        Ok(self
            .cipher
            .decrypt(&self.endpoint, &response, ephemeral_key)
            .await?)
    }

    /// Query `balanceOf(account)` on `contract`.
    ///
    /// `decimals` above [`MAX_DECIMALS`] cannot be rendered and are
    /// rejected before any network access.
    pub async fn balance_of(
        &self,
        wallet: &Wallet,
        contract: Address,
        account: Address,
        decimals: u8,
    ) -> Result<TokenBalance, QueryError> {
        if decimals > MAX_DECIMALS {
            return Err(DecodeError::Units(format!(
                "{} decimals exceeds the maximum of {}",
                decimals, MAX_DECIMALS
            ))
            .into());
        }

        let plaintext = self
            .send(wallet, contract, abi::encode_balance_of(account))
            .await?;
        let raw = abi::decode_balance(&plaintext)?;
        Ok(TokenBalance::new(raw, decimals))
    }
}
