//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Query pipeline produces:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (outcome counters, RPC latency)
//! ```
//!
//! Key material never appears in either.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
