//! Shielded call client.
//!
//! # Data Flow
//! ```text
//! abi.rs (encode balanceOf)
//!     → cipher.rs (encrypt for the node, keep ephemeral key)
//!     → query.rs (eth_call through the wallet's provider)
//!     → cipher.rs (decrypt with the same key)
//!     → abi.rs (decode uint256, format units)
//! ```
//!
//! # Invariants
//! - One envelope per call request, one decryption per envelope
//! - Ephemeral keys are single-use and never leave the process
//! - A key only opens responses from the endpoint it was made for

pub mod abi;
pub mod cipher;
pub mod query;
pub mod types;

pub use cipher::{NodeKeyCipher, NodeKeyPair, ShieldCipher};
pub use query::ShieldedQuery;
pub use types::{
    CallRequest, DecodeError, DecryptionError, EncryptedEnvelope, EncryptionError, EphemeralKey,
    QueryError, TokenBalance,
};
