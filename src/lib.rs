//! Shielded contract queries over encrypted JSON-RPC.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod shielded;

pub use blockchain::{NodeClient, Wallet};
pub use config::QueryConfig;
pub use shielded::{QueryError, ShieldedQuery};
