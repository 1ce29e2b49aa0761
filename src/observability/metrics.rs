//! Query metrics.
//!
//! # Metrics
//! - `shielded_queries_total` (counter): finished queries by outcome
//! - `shielded_rpc_duration_seconds` (histogram): node round trip by method
//!
//! No exporter is installed; an embedding application may install any
//! `metrics` recorder to collect these.

use std::time::Duration;

/// Record the final outcome of one shielded query.
pub fn record_query_outcome(outcome: &'static str) {
    metrics::counter!("shielded_queries_total", "outcome" => outcome).increment(1);
}

/// Record how long one RPC method took.
pub fn record_rpc_duration(method: &'static str, elapsed: Duration) {
    metrics::histogram!("shielded_rpc_duration_seconds", "method" => method)
        .record(elapsed.as_secs_f64());
}
