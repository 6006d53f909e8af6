//! Finalized-root delivery into the shard registry.

use std::sync::Arc;

use shared_types::{Hash, ShardId};
use tl_02_consensus::{SinkRejection, StateRootSink};
use tl_03_shards::{ShardRegistryApi, ShardRegistryService};

/// [`StateRootSink`] that mirrors finalized roots into the shard registry.
///
/// `update_state_root` authenticates against the shard's validator set, and
/// a finalized root is a product of exactly that quorum, so the sink submits
/// on behalf of the set's first member. The engine calls this before the
/// round commits; any rejection here aborts finalization.
pub struct ShardRootSink {
    shards: Arc<ShardRegistryService>,
}

impl ShardRootSink {
    /// Wraps a shard registry handle.
    pub fn new(shards: Arc<ShardRegistryService>) -> Self {
        Self { shards }
    }
}

impl StateRootSink for ShardRootSink {
    fn submit_root(&self, shard_id: ShardId, root: Hash) -> Result<(), SinkRejection> {
        let shard = self
            .shards
            .shard(shard_id)
            .ok_or_else(|| SinkRejection(format!("unknown shard {shard_id}")))?;
        let scribe = shard
            .validator_set
            .first()
            .copied()
            .ok_or_else(|| SinkRejection(format!("shard {shard_id} has no validators")))?;
        self.shards
            .update_state_root(&scribe, shard_id, root)
            .map_err(|e| SinkRejection(e.to_string()))
    }
}
