//! Prometheus metrics for Trellis subsystems.
//!
//! All metrics follow the naming convention `trellis_<subsystem>_<metric>`.
//!
//! ## Metric Types
//!
//! - **Counter**: monotonically increasing (e.g. `htlcs_total`)
//! - **Gauge**: value that can go up or down (e.g. `htlcs_pending`)

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry.
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // VALIDATOR REGISTRY METRICS (tl-01)
    // =========================================================================

    /// Total validators ever registered.
    pub static ref VALIDATORS_REGISTERED: Counter = Counter::new(
        "trellis_validators_registered_total",
        "Total validators registered"
    ).expect("metric creation failed");

    /// Validators currently in Active status.
    pub static ref VALIDATORS_ACTIVE: Gauge = Gauge::new(
        "trellis_validators_active",
        "Validators currently active"
    ).expect("metric creation failed");

    // =========================================================================
    // CONSENSUS METRICS (tl-02)
    // =========================================================================

    /// Consensus rounds by outcome (finalized/failed).
    pub static ref CONSENSUS_ROUNDS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("trellis_consensus_rounds_total", "Consensus rounds by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Total votes cast across all rounds.
    pub static ref VOTES_CAST: Counter = Counter::new(
        "trellis_consensus_votes_total",
        "Votes cast across all rounds"
    ).expect("metric creation failed");

    // =========================================================================
    // SHARD REGISTRY METRICS (tl-03)
    // =========================================================================

    /// Shards currently in Active status.
    pub static ref SHARDS_ACTIVE: Gauge = Gauge::new(
        "trellis_shards_active",
        "Shards currently active"
    ).expect("metric creation failed");

    /// Rebalance triggers fired.
    pub static ref SHARD_REBALANCES: Counter = Counter::new(
        "trellis_shard_rebalances_total",
        "Rebalance triggers fired"
    ).expect("metric creation failed");

    // =========================================================================
    // ROUTING METRICS (tl-04)
    // =========================================================================

    /// Cross-shard messages by outcome (sent/delivered/expired/acknowledged).
    pub static ref MESSAGES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("trellis_messages_total", "Cross-shard messages by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Batches by outcome (completed/failed).
    pub static ref BATCHES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("trellis_batches_total", "Message batches by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Routes currently in Congested status.
    pub static ref ROUTES_CONGESTED: Gauge = Gauge::new(
        "trellis_routes_congested",
        "Routes currently congested"
    ).expect("metric creation failed");

    // =========================================================================
    // BRIDGE METRICS (tl-05)
    // =========================================================================

    /// Bridge channel records currently active.
    pub static ref BRIDGE_CHANNELS_ACTIVE: Gauge = Gauge::new(
        "trellis_bridge_channels_active",
        "Bridge channel records currently active"
    ).expect("metric creation failed");

    /// Disputes opened.
    pub static ref DISPUTES_INITIATED: Counter = Counter::new(
        "trellis_bridge_disputes_initiated_total",
        "Disputes opened"
    ).expect("metric creation failed");

    /// Disputes resolved by validator supermajority.
    pub static ref DISPUTES_RESOLVED: Counter = Counter::new(
        "trellis_bridge_disputes_resolved_total",
        "Disputes resolved"
    ).expect("metric creation failed");

    // =========================================================================
    // CHANNEL LEDGER METRICS (tl-06)
    // =========================================================================

    /// Channels currently open (Opening through Closing).
    pub static ref CHANNELS_OPEN: Gauge = Gauge::new(
        "trellis_channels_open",
        "Channels currently open"
    ).expect("metric creation failed");

    /// HTLCs by outcome (created/resolved/refunded).
    pub static ref HTLCS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("trellis_htlcs_total", "HTLCs by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// HTLCs currently pending.
    pub static ref HTLCS_PENDING: Gauge = Gauge::new(
        "trellis_htlcs_pending",
        "HTLCs currently pending"
    ).expect("metric creation failed");
}

/// Register every metric with the global registry. Call once at startup.
pub fn register_metrics() -> Result<(), TelemetryError> {
    REGISTRY.register(Box::new(VALIDATORS_REGISTERED.clone()))?;
    REGISTRY.register(Box::new(VALIDATORS_ACTIVE.clone()))?;
    REGISTRY.register(Box::new(CONSENSUS_ROUNDS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(VOTES_CAST.clone()))?;
    REGISTRY.register(Box::new(SHARDS_ACTIVE.clone()))?;
    REGISTRY.register(Box::new(SHARD_REBALANCES.clone()))?;
    REGISTRY.register(Box::new(MESSAGES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(BATCHES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ROUTES_CONGESTED.clone()))?;
    REGISTRY.register(Box::new(BRIDGE_CHANNELS_ACTIVE.clone()))?;
    REGISTRY.register(Box::new(DISPUTES_INITIATED.clone()))?;
    REGISTRY.register(Box::new(DISPUTES_RESOLVED.clone()))?;
    REGISTRY.register(Box::new(CHANNELS_OPEN.clone()))?;
    REGISTRY.register(Box::new(HTLCS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(HTLCS_PENDING.clone()))?;
    Ok(())
}

/// Encode the registry in Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
