//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → QueryConfig (validated, immutable)
//!     → CLI overrides applied by the binary
//!     → passed explicitly into ShieldedQuery
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No global config state; the network settings travel as a value

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{NetworkConfig, ObservabilityConfig, QueryConfig, TokenConfig};
pub use validation::{validate_config, ValidationError, MAX_DECIMALS};
