//! Inbound port: the API this crate offers to the rest of the node.

use shared_types::{Address, Hash, ShardId};

use crate::domain::entities::Shard;
use crate::domain::errors::ShardResult;

/// Shard registry operations exposed to the runtime and to peer subsystems.
///
/// All methods are synchronous; the registry serializes writes behind a
/// single lock and never suspends mid-operation.
pub trait ShardRegistryApi: Send + Sync {
    /// Creates a shard with the next sequential id. Administrator only.
    fn create_shard(
        &self,
        caller: &Address,
        capacity: u64,
        validators: Vec<Address>,
    ) -> ShardResult<Shard>;

    /// Moves an `Initializing` shard into service. Administrator only.
    fn activate_shard(&self, caller: &Address, shard_id: ShardId) -> ShardResult<()>;

    /// Replaces the shard's load figure and evaluates the rebalance trigger.
    /// Returns the chosen rebalance target when one was selected. Callable by
    /// the shard's own validators.
    fn update_load(
        &self,
        caller: &Address,
        shard_id: ShardId,
        new_load: u64,
    ) -> ShardResult<Option<ShardId>>;

    /// Ends a rebalance: sheds load and returns the shard to `Active`.
    /// Administrator only.
    fn complete_rebalance(
        &self,
        caller: &Address,
        shard_id: ShardId,
        shed_load: u64,
    ) -> ShardResult<()>;

    /// Installs a newly finalized state root. Callable by the shard's own
    /// validators.
    fn update_state_root(&self, caller: &Address, shard_id: ShardId, root: Hash)
        -> ShardResult<()>;

    /// Takes a shard out of service. Administrator only.
    fn initiate_maintenance(
        &self,
        caller: &Address,
        shard_id: ShardId,
        reason: &str,
    ) -> ShardResult<()>;

    /// Returns a `Maintenance` or `Degraded` shard to service.
    /// Administrator only.
    fn restore_active(&self, caller: &Address, shard_id: ShardId) -> ShardResult<()>;

    /// Flags an `Active` shard as unhealthy. Administrator only.
    fn mark_degraded(&self, caller: &Address, shard_id: ShardId) -> ShardResult<()>;

    /// Snapshot of one shard.
    fn shard(&self, shard_id: ShardId) -> Option<Shard>;

    /// All shards ordered by id.
    fn shards(&self) -> Vec<Shard>;

    /// Number of registered shards.
    fn shard_count(&self) -> usize;
}
