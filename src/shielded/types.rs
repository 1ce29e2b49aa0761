//! Shielded call data model and error definitions.

use std::fmt;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use thiserror::Error;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::blockchain::types::{Endpoint, RpcError, WalletError};
use crate::config::ConfigError;
use crate::shielded::abi;

/// A read-only call, ready to be submitted to a node.
///
/// `payload` is whatever goes into the data field, normally the
/// encrypted envelope ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    destination: Address,
    payload: Bytes,
    nonce: u64,
    chain_id: u64,
    gas_limit: u64,
    gas_price: u128,
}

impl CallRequest {
    /// Build a simulated call. Gas price is always zero since nothing is mined.
    pub fn read_only(
        destination: Address,
        payload: Bytes,
        nonce: u64,
        chain_id: u64,
        gas_limit: u64,
    ) -> Self {
        Self {
            destination,
            payload,
            nonce,
            chain_id,
            gas_limit,
            gas_price: 0,
        }
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn gas_price(&self) -> u128 {
        self.gas_price
    }

    /// The `eth_call` transaction object for this request.
    pub fn to_transaction_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_to(self.destination)
            .with_input(self.payload.clone())
            .with_nonce(self.nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(self.gas_limit)
            .with_gas_price(self.gas_price)
    }
}

/// Single-use key material for one request/response round trip.
///
/// Deliberately neither `Clone` nor serializable: decryption consumes it,
/// so one key can open exactly one response.
pub struct EphemeralKey {
    secret: StaticSecret,
    node_public_key: PublicKey,
    endpoint: Endpoint,
}

impl EphemeralKey {
    pub(crate) fn new(secret: StaticSecret, node_public_key: PublicKey, endpoint: Endpoint) -> Self {
        Self {
            secret,
            node_public_key,
            endpoint,
        }
    }

    /// The endpoint whose key this was agreed against.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The client half of the key exchange, as sent to the node.
    pub fn public_key(&self) -> [u8; 32] {
        PublicKey::from(&self.secret).to_bytes()
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.secret
    }

    pub(crate) fn node_public_key(&self) -> &PublicKey {
        &self.node_public_key
    }
}

impl fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKey")
            .field("endpoint", &self.endpoint.to_string())
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// An encrypted payload and the key needed to open its response.
#[derive(Debug)]
pub struct EncryptedEnvelope<K = EphemeralKey> {
    ciphertext: Bytes,
    ephemeral_key: K,
}

impl<K> EncryptedEnvelope<K> {
    pub fn new(ciphertext: Bytes, ephemeral_key: K) -> Self {
        Self {
            ciphertext,
            ephemeral_key,
        }
    }

    pub fn ciphertext(&self) -> &Bytes {
        &self.ciphertext
    }

    /// Split into the data field to send and the key to keep.
    pub fn into_parts(self) -> (Bytes, K) {
        (self.ciphertext, self.ephemeral_key)
    }
}

/// A decoded token balance with its display precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalance {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenBalance {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Balance in token units, e.g. `"1000"` or `"0.25"`.
    pub fn formatted(&self) -> Result<String, DecodeError> {
        abi::format_units(self.raw, self.decimals)
    }
}

/// Failure to produce an encrypted envelope.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The node's key could not be fetched.
    #[error("failed to fetch node public key: {0}")]
    KeyFetch(#[from] RpcError),

    /// The node returned something that is not a usable x25519 key.
    #[error("malformed node public key: {0}")]
    MalformedNodeKey(String),

    /// AEAD sealing failed.
    #[error("payload encryption failed")]
    Seal,
}

/// Failure to open a node response.
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// Key was produced for a different node.
    #[error("ephemeral key belongs to {expected}, not {actual}")]
    EndpointMismatch { expected: String, actual: String },

    /// Response too short or not laid out as nonce || ciphertext.
    #[error("malformed encrypted response: {0}")]
    Malformed(String),

    /// Authentication failed: wrong key or tampered response.
    #[error("response authentication failed (wrong key or corrupted data)")]
    Authentication,
}

/// Failure to turn plaintext into typed values.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("ABI decode failed: {0}")]
    Abi(#[from] alloy::sol_types::Error),

    #[error("cannot format balance: {0}")]
    Units(String),
}

/// Any failure in the query pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("wallet doesn't contain connected provider")]
    MissingProvider,

    #[error("wallet provider is connected to {provider}, but queries target {configured}")]
    ProviderMismatch { provider: String, configured: String },

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("decryption error: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),
}

impl QueryError {
    /// Whether the failure came from talking to the node, including the
    /// key fetch that precedes encryption.
    pub fn is_rpc_failure(&self) -> bool {
        matches!(
            self,
            QueryError::Rpc(_) | QueryError::Encryption(EncryptionError::KeyFetch(_))
        )
    }
}
