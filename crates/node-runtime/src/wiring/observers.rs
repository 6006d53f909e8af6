//! Bus observers feeding the Prometheus registry.
//!
//! One task per topic subscribes to the bus and folds every envelope into
//! the process-wide metrics. Observers are read-only consumers: they never
//! call back into a subsystem, so a lagging observer can only undercount
//! metrics, never stall the ledger.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use shared_bus::{EventFilter, EventTopic, LedgerBus, LedgerEvent};
use trellis_telemetry::{
    BATCHES_TOTAL, BRIDGE_CHANNELS_ACTIVE, CHANNELS_OPEN, CONSENSUS_ROUNDS_TOTAL,
    DISPUTES_INITIATED, DISPUTES_RESOLVED, HTLCS_PENDING, HTLCS_TOTAL, MESSAGES_TOTAL,
    ROUTES_CONGESTED, SHARDS_ACTIVE, SHARD_REBALANCES, VALIDATORS_ACTIVE, VALIDATORS_REGISTERED,
    VOTES_CAST,
};

/// All topics an observer set covers.
const TOPICS: [EventTopic; 6] = [
    EventTopic::Validators,
    EventTopic::Consensus,
    EventTopic::Shards,
    EventTopic::Routing,
    EventTopic::Bridge,
    EventTopic::Channels,
];

/// Spawn one metric observer per topic. Each task runs until the bus closes
/// or the shutdown signal fires.
pub fn spawn_observers(
    bus: &LedgerBus,
    shutdown: &watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    TOPICS
        .iter()
        .map(|&topic| {
            let mut subscription = bus.subscribe(EventFilter::topics(vec![topic]));
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        received = subscription.recv() => match received {
                            Some(envelope) => {
                                debug!(
                                    sequence = envelope.sequence,
                                    tag = envelope.event.subsystem_tag(),
                                    "observed"
                                );
                                observe(&envelope.event);
                            }
                            None => break,
                        },
                        _ = shutdown.changed() => {
                            info!(?topic, "observer stopped");
                            break;
                        }
                    }
                }
            })
        })
        .collect()
}

/// Fold one event into the metrics registry.
///
/// Status-shaped gauges pair an increment on entry with a decrement on
/// exit, keyed on the stringified status carried by the event.
pub fn observe(event: &LedgerEvent) {
    match event {
        // tl-01
        LedgerEvent::ValidatorRegistered { .. } => VALIDATORS_REGISTERED.inc(),
        LedgerEvent::ValidatorStatusChanged {
            old_status,
            new_status,
            ..
        } => {
            if new_status == "Active" {
                VALIDATORS_ACTIVE.inc();
            }
            if old_status == "Active" {
                VALIDATORS_ACTIVE.dec();
            }
        }

        // tl-02
        LedgerEvent::VoteCast { .. } => VOTES_CAST.inc(),
        LedgerEvent::RoundFinalized { .. } => {
            CONSENSUS_ROUNDS_TOTAL.with_label_values(&["finalized"]).inc();
        }
        LedgerEvent::RoundFailed { .. } => {
            CONSENSUS_ROUNDS_TOTAL.with_label_values(&["failed"]).inc();
        }

        // tl-03
        LedgerEvent::ShardStatusChanged {
            old_status,
            new_status,
            ..
        } => {
            if new_status == "Active" {
                SHARDS_ACTIVE.inc();
            }
            if old_status == "Active" {
                SHARDS_ACTIVE.dec();
            }
        }
        LedgerEvent::RebalanceTriggered { .. } => SHARD_REBALANCES.inc(),

        // tl-04
        LedgerEvent::MessageSent { .. } => {
            MESSAGES_TOTAL.with_label_values(&["sent"]).inc();
        }
        LedgerEvent::MessageStatusChanged { new_status, .. } => match new_status.as_str() {
            "Delivered" => MESSAGES_TOTAL.with_label_values(&["delivered"]).inc(),
            "Expired" => MESSAGES_TOTAL.with_label_values(&["expired"]).inc(),
            "Acknowledged" => MESSAGES_TOTAL.with_label_values(&["acknowledged"]).inc(),
            _ => {}
        },
        LedgerEvent::BatchCompleted { .. } => {
            BATCHES_TOTAL.with_label_values(&["completed"]).inc();
        }
        LedgerEvent::BatchFailed { .. } => {
            BATCHES_TOTAL.with_label_values(&["failed"]).inc();
        }
        LedgerEvent::RouteStatusChanged {
            old_status,
            new_status,
            ..
        } => {
            if new_status == "Congested" {
                ROUTES_CONGESTED.inc();
            }
            if old_status == "Congested" {
                ROUTES_CONGESTED.dec();
            }
        }

        // tl-05
        LedgerEvent::BridgeChannelRegistered { .. } => BRIDGE_CHANNELS_ACTIVE.inc(),
        LedgerEvent::BridgeChannelDeactivated { .. } => BRIDGE_CHANNELS_ACTIVE.dec(),
        LedgerEvent::DisputeInitiated { .. } => DISPUTES_INITIATED.inc(),
        LedgerEvent::DisputeResolved { .. } => DISPUTES_RESOLVED.inc(),

        // tl-06
        LedgerEvent::ChannelOpened { .. } => CHANNELS_OPEN.inc(),
        LedgerEvent::ChannelClosed { .. } => CHANNELS_OPEN.dec(),
        LedgerEvent::HtlcCreated { .. } => {
            HTLCS_TOTAL.with_label_values(&["created"]).inc();
            HTLCS_PENDING.inc();
        }
        LedgerEvent::HtlcResolved { .. } => {
            HTLCS_TOTAL.with_label_values(&["resolved"]).inc();
            HTLCS_PENDING.dec();
        }
        LedgerEvent::HtlcRefunded { .. } => {
            HTLCS_TOTAL.with_label_values(&["refunded"]).inc();
            HTLCS_PENDING.dec();
        }

        _ => {}
    }
}
