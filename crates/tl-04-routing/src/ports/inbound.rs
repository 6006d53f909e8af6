//! Inbound port: the API this crate offers to the rest of the node.

use shared_types::{Address, MessageId, ShardId};
use uuid::Uuid;

use crate::domain::entities::{CrossShardMessage, MessageBatch, Route};
use crate::domain::errors::RoutingResult;
use crate::domain::value_objects::RouteStatus;

/// Point-in-time view of one route's health.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMetrics {
    /// Source shard.
    pub source: ShardId,
    /// Target shard.
    pub target: ShardId,
    /// Lifecycle status.
    pub status: RouteStatus,
    /// Message capacity.
    pub capacity: u64,
    /// In-flight message count.
    pub load: u64,
    /// Latency estimate in milliseconds.
    pub latency_ms: u64,
    /// Fraction of recent outcomes that delivered, `None` before the first.
    pub success_rate: Option<f64>,
    /// Outcomes currently in the rolling window.
    pub window_len: usize,
}

/// Routing operations exposed to the runtime and to peer subsystems.
///
/// All methods are synchronous; the fabric serializes writes behind a single
/// lock and never suspends mid-operation.
pub trait RoutingFabricApi: Send + Sync {
    /// Establishes a directional route for the ordered pair. A pair whose
    /// record is `Failed` or `Inactive` is replaced; a live record rejects.
    fn establish_route(
        &self,
        source: ShardId,
        target: ShardId,
        capacity: u64,
        latency_ms: u64,
    ) -> RoutingResult<Route>;

    /// Accepts a message onto the pair's route and returns its content-derived
    /// id. Flips the route `Congested` when the added load unit puts it at or
    /// above the congestion threshold; the tipping message is still accepted.
    fn send_message(
        &self,
        source: ShardId,
        target: ShardId,
        sender: Address,
        recipient: Address,
        payload: Vec<u8>,
    ) -> RoutingResult<MessageId>;

    /// Assembles an ordered batch from Pending, unclaimed messages on the
    /// pair's route.
    fn create_batch(
        &self,
        source: ShardId,
        target: ShardId,
        message_ids: Vec<MessageId>,
    ) -> RoutingResult<Uuid>;

    /// Walks a Pending batch in order: each message delivers and drains its
    /// load unit, or the first expired message fails the whole batch and
    /// later messages are left untouched.
    fn process_batch(&self, batch_id: Uuid) -> RoutingResult<()>;

    /// Confirms receipt of a Delivered message. Recipient only.
    fn acknowledge_message(&self, message_id: MessageId, caller: &Address) -> RoutingResult<()>;

    /// Administrative status override: emergency `Failed`, `Maintenance`,
    /// disabling, or clearing a congested route back to `Active`. Clearing is
    /// rejected while load still sits at the threshold. Administrator only.
    fn update_route_status(
        &self,
        caller: &Address,
        source: ShardId,
        target: ShardId,
        status: RouteStatus,
    ) -> RoutingResult<()>;

    /// Health snapshot of one route.
    fn route_metrics(&self, source: ShardId, target: ShardId) -> Option<RouteMetrics>;

    /// Snapshot of one route.
    fn route(&self, source: ShardId, target: ShardId) -> Option<Route>;

    /// All routes ordered by shard pair.
    fn routes(&self) -> Vec<Route>;

    /// Snapshot of one message.
    fn message(&self, message_id: MessageId) -> Option<CrossShardMessage>;

    /// Snapshot of one batch.
    fn batch(&self, batch_id: Uuid) -> Option<MessageBatch>;

    /// Number of established routes, live or dead.
    fn route_count(&self) -> usize;
}
