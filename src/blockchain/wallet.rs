//! Caller identity and its connected node.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - The key is only used to derive the caller address and is dropped
//!   afterwards; nothing is signed

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::WalletError;

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "SHIELDED_QUERY_PRIVATE_KEY";

/// The account a query is made on behalf of.
///
/// A wallet starts disconnected; [`Wallet::connect`] attaches the node
/// provider used for nonces and calls.
#[derive(Debug, Clone)]
pub struct Wallet {
    address: Address,
    has_signer: bool,
    provider: Option<NodeClient>,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidPrivateKey(format!("{}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self {
            address: signer.address(),
            has_signer: true,
            provider: None,
        })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `SHIELDED_QUERY_PRIVATE_KEY` from environment.
    pub fn from_env() -> Result<Self, WalletError> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR)
            .map_err(|_| WalletError::MissingEnv(PRIVATE_KEY_ENV_VAR))?;

        Self::from_private_key(&private_key)
    }

    /// A wallet that only knows its address.
    pub fn watch_only(address: Address) -> Self {
        Self {
            address,
            has_signer: false,
            provider: None,
        }
    }

    /// Attach the node this wallet queries through.
    pub fn connect(mut self, provider: NodeClient) -> Self {
        self.provider = Some(provider);
        self
    }

    /// The connected provider, if any.
    pub fn provider(&self) -> Option<&NodeClient> {
        self.provider.as_ref()
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether the wallet was created from a private key.
    pub fn has_signer(&self) -> bool {
        self.has_signer
    }
}
