//! Core entities for the routing fabric.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use shared_types::{Address, MessageId, RouteKey, ShardId};
use uuid::Uuid;

use super::errors::{RoutingError, RoutingResult};
use super::value_objects::{BatchStatus, MessageStatus, RouteStatus};

/// A directional link between two shards.
///
/// Routes are unidirectional; bidirectional traffic needs one record per
/// direction. `load` counts accepted messages that have not yet reached a
/// terminal status, so it never exceeds `capacity` while the congestion
/// threshold is at or below 100 percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Originating shard.
    pub source: ShardId,
    /// Destination shard.
    pub target: ShardId,
    /// Message capacity.
    pub capacity: u64,
    /// In-flight message count.
    pub load: u64,
    /// Latency estimate in milliseconds, supplied at establishment.
    pub latency_ms: u64,
    /// Lifecycle status.
    pub status: RouteStatus,
    /// Recent delivery outcomes, oldest first, bounded by the configured
    /// window. `true` is a delivery, `false` an expiry or failure.
    pub recent_outcomes: VecDeque<bool>,
    /// Establishment timestamp (seconds).
    pub established_at: u64,
}

impl Route {
    /// Creates an `Active` route with zero load and an empty outcome window.
    pub fn new(
        source: ShardId,
        target: ShardId,
        capacity: u64,
        latency_ms: u64,
        established_at: u64,
    ) -> Self {
        Self {
            source,
            target,
            capacity,
            load: 0,
            latency_ms,
            status: RouteStatus::Active,
            recent_outcomes: VecDeque::new(),
            established_at,
        }
    }

    /// The ordered shard pair this route is keyed by.
    pub fn key(&self) -> RouteKey {
        (self.source, self.target)
    }

    /// Moves the route to `target`, rejecting illegal transitions.
    pub fn transition_to(&mut self, target: RouteStatus) -> RoutingResult<()> {
        if !self.status.can_transition_to(&target) {
            return Err(RoutingError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{target:?}"),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Records one delivery outcome into the bounded window.
    pub fn record_outcome(&mut self, delivered: bool, window: usize) {
        if self.recent_outcomes.len() == window {
            self.recent_outcomes.pop_front();
        }
        self.recent_outcomes.push_back(delivered);
    }

    /// Fraction of recent outcomes that delivered, `None` before the first.
    pub fn success_rate(&self) -> Option<f64> {
        if self.recent_outcomes.is_empty() {
            return None;
        }
        let successes = self.recent_outcomes.iter().filter(|o| **o).count();
        Some(successes as f64 / self.recent_outcomes.len() as f64)
    }

    /// Releases one in-flight load unit.
    pub fn drain_one(&mut self) {
        self.load = self.load.saturating_sub(1);
    }
}

/// A message accepted onto a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossShardMessage {
    /// Content-derived id: Sha-256 over sender, pair, payload, and the
    /// fabric's send nonce.
    pub id: MessageId,
    /// Originating shard.
    pub source: ShardId,
    /// Destination shard.
    pub target: ShardId,
    /// Sending actor.
    pub sender: Address,
    /// Receiving actor.
    pub recipient: Address,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Acceptance timestamp (seconds).
    pub sent_at: u64,
    /// Unix time past which the message can no longer deliver.
    pub expires_at: u64,
    /// Lifecycle status.
    pub status: MessageStatus,
}

impl CrossShardMessage {
    /// Moves the message to `target`, rejecting illegal transitions.
    pub fn transition_to(&mut self, target: MessageStatus) -> RoutingResult<()> {
        if !self.status.can_transition_to(&target) {
            return Err(RoutingError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{target:?}"),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Whether the TTL has elapsed at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// An ordered delivery unit over one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBatch {
    /// Batch id.
    pub id: Uuid,
    /// Originating shard.
    pub source: ShardId,
    /// Destination shard.
    pub target: ShardId,
    /// Member messages in submission order.
    pub message_ids: Vec<MessageId>,
    /// Lifecycle status.
    pub status: BatchStatus,
    /// Assembly timestamp (seconds).
    pub created_at: u64,
}

impl MessageBatch {
    /// The route pair this batch travels.
    pub fn key(&self) -> RouteKey {
        (self.source, self.target)
    }
}
