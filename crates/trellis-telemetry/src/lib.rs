//! # Trellis Telemetry
//!
//! Structured logging and Prometheus metrics for the Trellis node.
//!
//! ## Components
//!
//! - **Tracing**: `tracing-subscriber` with an env filter, plain or JSON
//!   output. Subsystems tag their log lines `[tl-NN]`.
//! - **Metrics**: a process-wide Prometheus registry with `trellis_`-prefixed
//!   counters and gauges, scraped or dumped as text.
//!
//! Collection infrastructure (agents, dashboards) is deliberately not part of
//! this crate; it exposes the registry and leaves shipping to the operator.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trellis_telemetry::{TelemetryConfig, init_tracing, register_metrics};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_tracing(&config).expect("tracing init");
//!     register_metrics().expect("metrics registration");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, BATCHES_TOTAL, BRIDGE_CHANNELS_ACTIVE, CHANNELS_OPEN,
    CONSENSUS_ROUNDS_TOTAL, DISPUTES_INITIATED, DISPUTES_RESOLVED, HTLCS_PENDING, HTLCS_TOTAL,
    MESSAGES_TOTAL, REGISTRY, ROUTES_CONGESTED, SHARDS_ACTIVE, SHARD_REBALANCES,
    VALIDATORS_ACTIVE, VALIDATORS_REGISTERED, VOTES_CAST,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization failures.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global tracing subscriber was already installed.
    #[error("tracing subscriber already installed")]
    AlreadyInitialized,

    /// The configured log filter directive does not parse.
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// Metric registration failed (duplicate registration).
    #[error("metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),
}
