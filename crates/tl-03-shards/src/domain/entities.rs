//! Core entities for the shard registry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, ShardId};

use super::errors::{ShardError, ShardResult};
use super::value_objects::ShardStatus;

/// One shard of the ledger and everything the registry tracks about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shard {
    /// Sequential id, assigned at creation.
    pub id: ShardId,
    /// Load capacity.
    pub capacity: u64,
    /// Current load. Never exceeds `capacity`.
    pub load: u64,
    /// Lifecycle status.
    pub status: ShardStatus,
    /// Latest finalized state root, absent until the first finalization.
    pub state_root: Option<Hash>,
    /// Superseded roots, newest last, bounded by the configured capacity.
    pub root_history: VecDeque<Hash>,
    /// Validators serving this shard.
    pub validator_set: Vec<Address>,
    /// Timestamp of the last rebalance attempt, absent before the first.
    pub last_rebalance: Option<u64>,
    /// Creation timestamp (seconds).
    pub created_at: u64,
}

impl Shard {
    /// Creates a shard in `Initializing` status with zero load.
    pub fn new(id: ShardId, capacity: u64, validator_set: Vec<Address>, created_at: u64) -> Self {
        Self {
            id,
            capacity,
            load: 0,
            status: ShardStatus::Initializing,
            state_root: None,
            root_history: VecDeque::new(),
            validator_set,
            last_rebalance: None,
            created_at,
        }
    }

    /// Moves the shard to `target`, rejecting illegal transitions.
    pub fn transition_to(&mut self, target: ShardStatus) -> ShardResult<()> {
        if !self.status.can_transition_to(&target) {
            return Err(ShardError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", target),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Integer utilization in percent, rounded down. Zero-capacity shards
    /// cannot be created, so the division is safe.
    pub fn utilization_percent(&self) -> u8 {
        (u128::from(self.load) * 100 / u128::from(self.capacity)) as u8
    }

    /// Spare load units before the shard is full.
    pub fn spare_capacity(&self) -> u64 {
        self.capacity - self.load
    }

    /// Whether `who` serves this shard.
    pub fn has_validator(&self, who: &Address) -> bool {
        self.validator_set.contains(who)
    }

    /// Installs a new finalized root, pushing the superseded one into the
    /// bounded history ring. Returns the superseded root.
    pub fn record_root(&mut self, root: Hash, history_capacity: usize) -> Option<Hash> {
        let old = self.state_root.replace(root);
        if let Some(prev) = old {
            if self.root_history.len() == history_capacity {
                self.root_history.pop_front();
            }
            self.root_history.push_back(prev);
        }
        old
    }

    /// Creates an active two-validator shard for tests.
    pub fn for_testing(id: ShardId, capacity: u64) -> Self {
        let mut shard = Self::new(id, capacity, vec![[1u8; 20], [2u8; 20]], 0);
        shard.status = ShardStatus::Active;
        shard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_shard_is_initializing() {
        let shard = Shard::new(0, 1000, vec![[1u8; 20]], 5);
        assert_eq!(shard.status, ShardStatus::Initializing);
        assert_eq!(shard.load, 0);
        assert!(shard.state_root.is_none());
        assert!(shard.last_rebalance.is_none());
    }

    #[test]
    fn test_transition_enforced() {
        let mut shard = Shard::new(0, 1000, vec![[1u8; 20]], 0);
        assert!(shard.transition_to(ShardStatus::Maintenance).is_err());
        shard.transition_to(ShardStatus::Active).unwrap();
        shard.transition_to(ShardStatus::Rebalancing).unwrap();
        assert_eq!(shard.status, ShardStatus::Rebalancing);
    }

    #[test]
    fn test_utilization_rounds_down() {
        let mut shard = Shard::for_testing(0, 1000);
        shard.load = 949;
        assert_eq!(shard.utilization_percent(), 94);
        shard.load = 950;
        assert_eq!(shard.utilization_percent(), 95);
    }

    #[test]
    fn test_root_history_is_bounded() {
        let mut shard = Shard::for_testing(0, 100);
        assert_eq!(shard.record_root([1u8; 32], 2), None);
        assert_eq!(shard.record_root([2u8; 32], 2), Some([1u8; 32]));
        shard.record_root([3u8; 32], 2);
        shard.record_root([4u8; 32], 2);

        // Ring holds the two most recent superseded roots.
        assert_eq!(shard.root_history.len(), 2);
        assert_eq!(shard.root_history[0], [2u8; 32]);
        assert_eq!(shard.root_history[1], [3u8; 32]);
        assert_eq!(shard.state_root, Some([4u8; 32]));
    }

    #[test]
    fn test_validator_membership() {
        let shard = Shard::for_testing(0, 100);
        assert!(shard.has_validator(&[1u8; 20]));
        assert!(!shard.has_validator(&[9u8; 20]));
    }
}
