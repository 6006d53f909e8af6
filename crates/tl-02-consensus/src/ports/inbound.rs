//! Inbound port: the API this crate offers to the rest of the node.

use shared_types::{Address, Hash, RoundId, ShardId};

use crate::domain::entities::{ConsensusRound, VoteReceipt};
use crate::domain::errors::ConsensusResult;

/// Consensus operations exposed to the runtime and to peer subsystems.
///
/// All methods are synchronous; the engine serializes writes behind a
/// single lock and never suspends mid-operation.
pub trait ConsensusApi: Send + Sync {
    /// Registers a shard with the engine. Administrator only.
    fn configure_shard(&self, caller: &Address, shard_id: ShardId) -> ConsensusResult<()>;

    /// Opens the next round on a shard. Callable by the shard's active
    /// validators; fails while another round is open.
    fn start_round(&self, shard_id: ShardId, caller: &Address) -> ConsensusResult<ConsensusRound>;

    /// Submits the proposed state root. Proposer only, while the round is
    /// `Active` and before its deadline.
    fn propose_state(
        &self,
        shard_id: ShardId,
        round_id: RoundId,
        state_root: Hash,
        caller: &Address,
    ) -> ConsensusResult<()>;

    /// Casts one vote. Reaching the threshold finalizes the round in the
    /// same call: the root is pushed downstream and rewards accrue.
    fn cast_vote(
        &self,
        shard_id: ShardId,
        round_id: RoundId,
        caller: &Address,
        support: bool,
    ) -> ConsensusResult<VoteReceipt>;

    /// Fails an open round whose deadline has passed. The deadline sweep
    /// calls this; it never fires early.
    fn mark_failed(&self, shard_id: ShardId, round_id: RoundId) -> ConsensusResult<()>;

    /// The round currently open on a shard, if any.
    fn current_round(&self, shard_id: ShardId) -> Option<ConsensusRound>;

    /// Finished rounds retained for the shard, oldest first.
    fn recent_rounds(&self, shard_id: ShardId) -> Vec<ConsensusRound>;

    /// Whether the shard has been configured.
    fn is_configured(&self, shard_id: ShardId) -> bool;
}
