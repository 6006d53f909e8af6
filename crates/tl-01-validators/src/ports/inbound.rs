//! Inbound port: the API this crate offers to the rest of the node.

use shared_types::{Address, Amount, BasisPoints, PublicKey, ShardId};

use crate::domain::entities::Validator;
use crate::domain::errors::ValidatorResult;

/// Registry operations exposed to the runtime and to peer subsystems.
///
/// All methods are synchronous; the registry serializes writes behind a
/// single lock and never suspends mid-operation.
pub trait ValidatorRegistryApi: Send + Sync {
    /// Registers a new validator in `Pending` status and locks its stake.
    fn register(
        &self,
        identity: Address,
        public_key: PublicKey,
        stake: Amount,
        commission_bps: BasisPoints,
    ) -> ValidatorResult<Validator>;

    /// Promotes a `Pending` validator to `Active`.
    fn activate(&self, identity: &Address) -> ValidatorResult<()>;

    /// Assigns an active validator to a shard. Administrator only.
    fn assign_to_shard(
        &self,
        caller: &Address,
        identity: &Address,
        shard_id: ShardId,
    ) -> ValidatorResult<()>;

    /// Overwrites the performance score for one assignment. Administrator only.
    fn update_performance(
        &self,
        caller: &Address,
        identity: &Address,
        shard_id: ShardId,
        score: u8,
    ) -> ValidatorResult<()>;

    /// Slashes an active validator: deducts the penalty and retires it for good.
    /// Returns the deducted amount. Administrator only.
    fn slash(&self, caller: &Address, identity: &Address, reason: &str) -> ValidatorResult<Amount>;

    /// Jails an active validator until the configured term elapses.
    /// Administrator only.
    fn jail(&self, caller: &Address, identity: &Address) -> ValidatorResult<u64>;

    /// Returns a jailed validator to `Active` once its term has elapsed.
    fn release_from_jail(&self, identity: &Address) -> ValidatorResult<()>;

    /// Withdraws remaining stake for a `Pending` or `Slashed` validator.
    fn withdraw_stake(&self, identity: &Address) -> ValidatorResult<Amount>;

    /// Credits a finalized proposal to the validator's record.
    fn record_proposal_success(&self, identity: &Address) -> ValidatorResult<u64>;

    /// Accrues a reward amount to the validator's balance.
    fn accrue_reward(&self, identity: &Address, amount: Amount) -> ValidatorResult<Amount>;

    /// Snapshot of one validator.
    fn validator(&self, identity: &Address) -> Option<Validator>;

    /// Active validators assigned to `shard_id`, sorted by identity.
    fn active_validators_of_shard(&self, shard_id: ShardId) -> Vec<Validator>;

    /// All active validators, sorted by identity.
    fn active_validators(&self) -> Vec<Validator>;

    /// Whether an identity is registered at all.
    fn is_registered(&self, identity: &Address) -> bool;

    /// Total number of registered validators in any status.
    fn registered_count(&self) -> usize;
}
