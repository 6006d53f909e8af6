//! Value objects for the routing fabric.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a directional route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteStatus {
    /// Administratively disabled; no traffic until re-enabled or replaced.
    Inactive,
    /// Accepting and delivering messages.
    Active,
    /// Load crossed the congestion threshold; sends are rejected until an
    /// administrator clears the route.
    Congested,
    /// Taken out of service by the operator; queued messages stay parked.
    Maintenance,
    /// Dead. Only re-establishing the pair replaces the record.
    Failed,
}

impl RouteStatus {
    /// Whether a transition from this status to `target` is permitted.
    pub fn can_transition_to(&self, target: &RouteStatus) -> bool {
        use RouteStatus::*;
        matches!(
            (self, target),
            (Active, Congested)
                | (Active, Maintenance)
                | (Active, Failed)
                | (Active, Inactive)
                | (Congested, Active)
                | (Congested, Maintenance)
                | (Congested, Failed)
                | (Maintenance, Active)
                | (Maintenance, Failed)
                | (Inactive, Active)
        )
    }

    /// Whether the route accepts new messages in this status.
    pub fn accepts_traffic(&self) -> bool {
        matches!(self, RouteStatus::Active)
    }

    /// Whether batch processing may drain the route in this status.
    /// Congested routes keep draining; that is how load recovers.
    pub fn can_drain(&self) -> bool {
        matches!(self, RouteStatus::Active | RouteStatus::Congested)
    }

    /// Whether a new `establish_route` call may replace this record.
    pub fn is_replaceable(&self) -> bool {
        matches!(self, RouteStatus::Inactive | RouteStatus::Failed)
    }
}

/// Lifecycle status of a cross-shard message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Accepted onto a route, waiting to be batched and processed.
    Pending,
    /// Being carried by a batch that is currently processing.
    InTransit,
    /// Reached the target shard.
    Delivered,
    /// The carrying route was withdrawn before delivery.
    Failed,
    /// TTL elapsed before delivery.
    Expired,
    /// Receipt confirmed by the recipient.
    Acknowledged,
}

impl MessageStatus {
    /// Whether a transition from this status to `target` is permitted.
    pub fn can_transition_to(&self, target: &MessageStatus) -> bool {
        use MessageStatus::*;
        matches!(
            (self, target),
            (Pending, InTransit)
                | (Pending, Failed)
                | (InTransit, Delivered)
                | (InTransit, Expired)
                | (Delivered, Acknowledged)
        )
    }

    /// Whether the message can never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MessageStatus::Failed | MessageStatus::Expired | MessageStatus::Acknowledged
        )
    }

    /// Whether the message still holds a load unit on its route.
    pub fn holds_load(&self) -> bool {
        matches!(self, MessageStatus::Pending | MessageStatus::InTransit)
    }
}

/// Lifecycle status of a message batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Assembled, not yet processed.
    Pending,
    /// Messages are being walked in order.
    Processing,
    /// Every message delivered.
    Completed,
    /// Aborted at the first failing message.
    Failed,
}

impl BatchStatus {
    /// Whether the batch reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }
}
