//! Outbound ports: dependencies the engine needs from its host.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use shared_types::{Address, Amount, Hash, ShardId};

/// Validator membership and reward bookkeeping, served by the registry.
///
/// The reward calls are bookkeeping pass-throughs: a finalized round must
/// not unwind because a counter update failed, so they are infallible here
/// and adapters absorb downstream refusals.
pub trait ValidatorDirectory: Send + Sync {
    /// Active validators assigned to the shard, sorted ascending.
    fn active_validators(&self, shard_id: ShardId) -> Vec<Address>;

    /// Whether `who` is an active validator of the shard right now.
    fn is_active_validator(&self, shard_id: ShardId, who: &Address) -> bool;

    /// Credits a finalized proposal to the proposer's record.
    fn record_proposal_success(&self, identity: &Address);

    /// Accrues reward units to a validator.
    fn accrue_reward(&self, identity: &Address, amount: Amount);
}

/// Refusal from the downstream root consumer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SinkRejection(pub String);

/// Destination for finalized state roots (the shard registry's mirror).
/// Called before the round commits, so a refusal aborts finalization.
pub trait StateRootSink: Send + Sync {
    /// Delivers a finalized root for the shard.
    fn submit_root(&self, shard_id: ShardId, root: Hash) -> Result<(), SinkRejection>;
}

/// Directory backed by in-process maps, for tests and standalone use.
#[derive(Debug, Default)]
pub struct StaticValidatorDirectory {
    active: RwLock<HashMap<ShardId, Vec<Address>>>,
    proposals: RwLock<HashMap<Address, u64>>,
    rewards: RwLock<HashMap<Address, Amount>>,
}

impl StaticValidatorDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active set for a shard. The set is stored sorted.
    pub fn set_validators(&self, shard_id: ShardId, mut validators: Vec<Address>) {
        validators.sort();
        self.active.write().insert(shard_id, validators);
    }

    /// Successful proposals recorded for `who`.
    pub fn proposal_count(&self, who: &Address) -> u64 {
        self.proposals.read().get(who).copied().unwrap_or(0)
    }

    /// Reward units accrued for `who`.
    pub fn reward_total(&self, who: &Address) -> Amount {
        self.rewards.read().get(who).copied().unwrap_or(0)
    }
}

impl ValidatorDirectory for StaticValidatorDirectory {
    fn active_validators(&self, shard_id: ShardId) -> Vec<Address> {
        self.active.read().get(&shard_id).cloned().unwrap_or_default()
    }

    fn is_active_validator(&self, shard_id: ShardId, who: &Address) -> bool {
        self.active
            .read()
            .get(&shard_id)
            .is_some_and(|set| set.contains(who))
    }

    fn record_proposal_success(&self, identity: &Address) {
        *self.proposals.write().entry(*identity).or_insert(0) += 1;
    }

    fn accrue_reward(&self, identity: &Address, amount: Amount) {
        let mut rewards = self.rewards.write();
        let entry = rewards.entry(*identity).or_insert(0);
        *entry = entry.saturating_add(amount);
    }
}

/// Root sink backed by an in-process map, for tests and standalone use.
#[derive(Debug, Default)]
pub struct MemoryRootSink {
    roots: RwLock<HashMap<ShardId, Hash>>,
}

impl MemoryRootSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last root submitted for `shard_id`.
    pub fn root_of(&self, shard_id: ShardId) -> Option<Hash> {
        self.roots.read().get(&shard_id).copied()
    }
}

impl StateRootSink for MemoryRootSink {
    fn submit_root(&self, shard_id: ShardId, root: Hash) -> Result<(), SinkRejection> {
        self.roots.write().insert(shard_id, root);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_sorts_validator_sets() {
        let dir = StaticValidatorDirectory::new();
        dir.set_validators(0, vec![[3u8; 20], [1u8; 20], [2u8; 20]]);
        assert_eq!(
            dir.active_validators(0),
            vec![[1u8; 20], [2u8; 20], [3u8; 20]]
        );
        assert!(dir.is_active_validator(0, &[2u8; 20]));
        assert!(!dir.is_active_validator(0, &[9u8; 20]));
        assert!(dir.active_validators(7).is_empty());
    }

    #[test]
    fn test_directory_bookkeeping() {
        let dir = StaticValidatorDirectory::new();
        let v = [1u8; 20];
        dir.record_proposal_success(&v);
        dir.record_proposal_success(&v);
        dir.accrue_reward(&v, 50);
        dir.accrue_reward(&v, 10);
        assert_eq!(dir.proposal_count(&v), 2);
        assert_eq!(dir.reward_total(&v), 60);
    }

    #[test]
    fn test_memory_sink_stores_latest() {
        let sink = MemoryRootSink::new();
        sink.submit_root(1, [1u8; 32]).unwrap();
        sink.submit_root(1, [2u8; 32]).unwrap();
        assert_eq!(sink.root_of(1), Some([2u8; 32]));
        assert_eq!(sink.root_of(2), None);
    }
}
