//! Core entities for the consensus engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, RoundId, ShardId};

use super::errors::{ConsensusError, ConsensusResult};
use super::value_objects::RoundState;

/// One consensus round on one shard.
///
/// The electorate is fixed at start: `eligible` holds the shard's active
/// validators sorted ascending, and both the proposer and the threshold are
/// derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusRound {
    /// Shard the round runs on.
    pub shard_id: ShardId,
    /// Round id, monotonic per shard starting at 1.
    pub round_id: RoundId,
    /// Deterministically selected proposer.
    pub proposer: Address,
    /// Electorate snapshot, sorted ascending.
    pub eligible: Vec<Address>,
    /// Root submitted by the proposer, absent until the proposal.
    pub proposed_root: Option<Hash>,
    /// Votes keyed by validator; `true` supports the proposal.
    pub votes: HashMap<Address, bool>,
    /// Count of supporting votes.
    pub votes_for: u32,
    /// Supporting votes required to finalize.
    pub required: u32,
    /// Lifecycle state.
    pub state: RoundState,
    /// Start timestamp (seconds).
    pub started_at: u64,
    /// Deadline after which the round can only fail.
    pub end_time: u64,
}

impl ConsensusRound {
    /// Allocates a round in `Pending` state.
    pub fn new(
        shard_id: ShardId,
        round_id: RoundId,
        proposer: Address,
        eligible: Vec<Address>,
        required: u32,
        started_at: u64,
        end_time: u64,
    ) -> Self {
        Self {
            shard_id,
            round_id,
            proposer,
            eligible,
            proposed_root: None,
            votes: HashMap::new(),
            votes_for: 0,
            required,
            state: RoundState::Pending,
            started_at,
            end_time,
        }
    }

    /// Moves the round to `target`, rejecting illegal transitions.
    pub fn transition_to(&mut self, target: RoundState) -> ConsensusResult<()> {
        if !self.state.can_transition_to(&target) {
            return Err(ConsensusError::InvalidTransition {
                from: format!("{:?}", self.state),
                to: format!("{:?}", target),
            });
        }
        self.state = target;
        Ok(())
    }

    /// Whether `who` belongs to the electorate snapshot.
    pub fn is_eligible(&self, who: &Address) -> bool {
        self.eligible.contains(who)
    }

    /// Whether `who` has voted already.
    pub fn has_voted(&self, who: &Address) -> bool {
        self.votes.contains_key(who)
    }

    /// Whether the deadline has passed at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.end_time
    }

    /// Records one vote. Callers check eligibility and double-voting first.
    pub fn record_vote(&mut self, who: Address, support: bool) {
        self.votes.insert(who, support);
        if support {
            self.votes_for += 1;
        }
    }

    /// Supporting voters in electorate order.
    pub fn supporting_voters(&self) -> Vec<Address> {
        self.eligible
            .iter()
            .filter(|v| self.votes.get(*v) == Some(&true))
            .copied()
            .collect()
    }

    /// Creates a two-validator round in `Voting` state for tests.
    pub fn for_testing(shard_id: ShardId, round_id: RoundId) -> Self {
        let eligible = vec![[1u8; 20], [2u8; 20]];
        let mut round = Self::new(shard_id, round_id, [1u8; 20], eligible, 2, 0, 60);
        round.state = RoundState::Voting;
        round.proposed_root = Some([0xaa; 32]);
        round
    }
}

/// Outcome of one accepted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// Supporting votes after this one.
    pub votes_for: u32,
    /// Supporting votes required to finalize.
    pub required: u32,
    /// Whether this vote finalized the round.
    pub finalized: bool,
}
