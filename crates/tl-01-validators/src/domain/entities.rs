//! Core entities for the validator registry.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, BasisPoints, PublicKey, ShardId};

use super::errors::{ValidatorError, ValidatorResult};
use super::value_objects::ValidatorStatus;

/// Membership of a validator on one shard, with its rolling performance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardAssignment {
    /// Shard the validator serves.
    pub shard_id: ShardId,
    /// Rolling performance score in 0..=100. New assignments start at 100.
    pub performance_score: u8,
    /// Timestamp the assignment was made (seconds).
    pub assigned_at: u64,
}

impl ShardAssignment {
    /// Creates a fresh assignment with a perfect starting score.
    pub fn new(shard_id: ShardId, assigned_at: u64) -> Self {
        Self {
            shard_id,
            performance_score: 100,
            assigned_at,
        }
    }
}

/// A registered validator and everything the registry tracks about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validator {
    /// On-ledger identity of the operator.
    pub identity: Address,
    /// Consensus public key used to verify this validator's signatures.
    pub public_key: PublicKey,
    /// Stake currently locked behind this validator.
    pub stake: Amount,
    /// Commission charged on rewards, in basis points.
    pub commission_bps: BasisPoints,
    /// Lifecycle status.
    pub status: ValidatorStatus,
    /// Shards this validator serves.
    pub assignments: Vec<ShardAssignment>,
    /// Release timestamp while jailed, `None` otherwise.
    pub jailed_until: Option<u64>,
    /// Count of rounds this validator proposed that reached finalization.
    pub successful_proposals: u64,
    /// Rewards accrued and not yet withdrawn.
    pub accrued_rewards: Amount,
    /// Registration timestamp (seconds).
    pub registered_at: u64,
}

impl Validator {
    /// Creates a new validator in `Pending` status.
    pub fn new(
        identity: Address,
        public_key: PublicKey,
        stake: Amount,
        commission_bps: BasisPoints,
        registered_at: u64,
    ) -> Self {
        Self {
            identity,
            public_key,
            stake,
            commission_bps,
            status: ValidatorStatus::Pending,
            assignments: Vec::new(),
            jailed_until: None,
            successful_proposals: 0,
            accrued_rewards: 0,
            registered_at,
        }
    }

    /// Moves the validator to `target`, rejecting illegal transitions.
    pub fn transition_to(&mut self, target: ValidatorStatus) -> ValidatorResult<()> {
        if !self.status.can_transition_to(&target) {
            return Err(ValidatorError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", target),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Looks up the assignment for `shard_id`, if any.
    pub fn assignment(&self, shard_id: ShardId) -> Option<&ShardAssignment> {
        self.assignments.iter().find(|a| a.shard_id == shard_id)
    }

    /// Mutable assignment lookup.
    pub fn assignment_mut(&mut self, shard_id: ShardId) -> Option<&mut ShardAssignment> {
        self.assignments.iter_mut().find(|a| a.shard_id == shard_id)
    }

    /// Whether this validator serves `shard_id`.
    pub fn is_assigned_to(&self, shard_id: ShardId) -> bool {
        self.assignment(shard_id).is_some()
    }

    /// Whether this validator may vote and propose right now.
    pub fn is_participating(&self) -> bool {
        self.status.is_participating()
    }

    /// Creates a validator with placeholder key and stake for tests.
    pub fn for_testing(identity: Address) -> Self {
        Self::new(identity, [7u8; 32], 1_000_000, 500, 0)
    }
}
