//! Node connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key) / CLI address
//!     → wallet.rs (caller identity, connected provider)
//!     → client.rs (RPC connection with timeouts)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod types;
pub mod wallet;

pub use client::NodeClient;
pub use types::{ChainId, Endpoint, RpcError, RpcResult, WalletError};
pub use wallet::Wallet;
