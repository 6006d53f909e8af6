//! Value objects for the shard registry.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShardStatus {
    /// Created but not yet serving; validators are being wired up.
    Initializing,
    /// Serving normally.
    Active,
    /// Serving with reduced health; flagged for operator attention.
    Degraded,
    /// Load crossed the threshold; shedding load onto a target shard.
    Rebalancing,
    /// Taken out of service by the operator.
    Maintenance,
}

impl ShardStatus {
    /// Whether a transition from this status to `target` is permitted.
    pub fn can_transition_to(&self, target: &ShardStatus) -> bool {
        use ShardStatus::*;
        matches!(
            (self, target),
            (Initializing, Active)
                | (Active, Rebalancing)
                | (Active, Degraded)
                | (Active, Maintenance)
                | (Rebalancing, Active)
                | (Degraded, Active)
                | (Degraded, Maintenance)
                | (Maintenance, Active)
        )
    }

    /// Whether the shard accepts load updates in this status.
    pub fn is_serving(&self) -> bool {
        matches!(
            self,
            ShardStatus::Active | ShardStatus::Degraded | ShardStatus::Rebalancing
        )
    }
}
