//! Consensus engine: serialized writes over the per-shard round slots.
//!
//! All validation runs before the first write of an operation. Finalization
//! pushes the root through the downstream sink before committing the final
//! vote, so a sink refusal leaves the round open and the vote uncast.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use shared_bus::{EventSink, LedgerEvent};
use shared_types::config::ConsensusParams;
use shared_types::{short_addr, Address, Capability, CapabilityProbe, Hash, RoundId, ShardId,
    TimeSource};

use crate::domain::entities::{ConsensusRound, VoteReceipt};
use crate::domain::errors::{ConsensusError, ConsensusResult};
use crate::domain::invariants::{select_proposer, vote_threshold};
use crate::domain::value_objects::RoundState;
use crate::ports::inbound::ConsensusApi;
use crate::ports::outbound::{StateRootSink, ValidatorDirectory};

/// Round bookkeeping for one configured shard.
#[derive(Debug)]
struct ShardConsensus {
    next_round_id: RoundId,
    current: Option<ConsensusRound>,
    history: VecDeque<ConsensusRound>,
}

impl ShardConsensus {
    fn new() -> Self {
        Self {
            next_round_id: 1,
            current: None,
            history: VecDeque::new(),
        }
    }
}

/// The consensus engine. Single-writer; every operation takes the store
/// lock, validates, commits, releases, then emits.
pub struct ConsensusEngine {
    store: RwLock<HashMap<ShardId, ShardConsensus>>,
    params: ConsensusParams,
    probe: Arc<dyn CapabilityProbe>,
    directory: Arc<dyn ValidatorDirectory>,
    roots: Arc<dyn StateRootSink>,
    sink: Arc<dyn EventSink>,
    time: Arc<dyn TimeSource>,
}

impl ConsensusEngine {
    /// Creates an engine with the given parameter set and dependencies.
    pub fn new(
        params: ConsensusParams,
        probe: Arc<dyn CapabilityProbe>,
        directory: Arc<dyn ValidatorDirectory>,
        roots: Arc<dyn StateRootSink>,
        sink: Arc<dyn EventSink>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            params,
            probe,
            directory,
            roots,
            sink,
            time,
        }
    }

    /// Moves a finished round into the shard's bounded history ring.
    fn retire_round(slot: &mut ShardConsensus, capacity: usize) {
        if let Some(done) = slot.current.take() {
            if slot.history.len() == capacity {
                slot.history.pop_front();
            }
            slot.history.push_back(done);
        }
    }
}

impl ConsensusApi for ConsensusEngine {
    fn configure_shard(&self, caller: &Address, shard_id: ShardId) -> ConsensusResult<()> {
        if !self.probe.has_capability(caller, &Capability::Administrator) {
            return Err(ConsensusError::NotAuthorized { action: "configure_shard" });
        }
        let mut store = self.store.write();
        if store.contains_key(&shard_id) {
            return Err(ConsensusError::AlreadyConfigured(shard_id));
        }
        store.insert(shard_id, ShardConsensus::new());
        drop(store);

        info!(shard_id, "consensus configured");
        Ok(())
    }

    fn start_round(&self, shard_id: ShardId, caller: &Address) -> ConsensusResult<ConsensusRound> {
        let mut store = self.store.write();
        let slot = store
            .get_mut(&shard_id)
            .ok_or(ConsensusError::ConsensusNotConfigured(shard_id))?;

        if let Some(open) = slot.current.as_ref().filter(|r| r.state.is_open()) {
            return Err(ConsensusError::RoundInProgress {
                shard_id,
                round_id: open.round_id,
            });
        }

        let mut electorate = self.directory.active_validators(shard_id);
        electorate.sort();
        if electorate.is_empty() {
            return Err(ConsensusError::NoActiveValidators { shard_id });
        }
        if !electorate.contains(caller) {
            return Err(ConsensusError::NotShardValidator { shard_id });
        }

        let round_id = slot.next_round_id;
        let proposer = select_proposer(&electorate, round_id);
        let required = vote_threshold(electorate.len(), self.params.approval_percent);
        let now = self.time.now();
        let end_time = now + self.params.round_duration_secs;

        let mut round =
            ConsensusRound::new(shard_id, round_id, proposer, electorate, required, now, end_time);
        round.transition_to(RoundState::Active)?;
        slot.next_round_id += 1;
        slot.current = Some(round.clone());
        drop(store);

        info!(
            shard_id,
            round_id,
            proposer = %short_addr(&proposer),
            required,
            "round started"
        );
        self.sink.emit(LedgerEvent::RoundStarted {
            shard_id,
            round_id,
            proposer,
            end_time,
        });
        Ok(round)
    }

    fn propose_state(
        &self,
        shard_id: ShardId,
        round_id: RoundId,
        state_root: Hash,
        caller: &Address,
    ) -> ConsensusResult<()> {
        let mut store = self.store.write();
        let slot = store
            .get_mut(&shard_id)
            .ok_or(ConsensusError::ConsensusNotConfigured(shard_id))?;
        let round = slot
            .current
            .as_mut()
            .filter(|r| r.round_id == round_id)
            .ok_or(ConsensusError::UnknownRound { shard_id, round_id })?;

        if caller != &round.proposer {
            return Err(ConsensusError::NotProposer {
                expected: short_addr(&round.proposer),
            });
        }
        if round.state != RoundState::Active {
            return Err(ConsensusError::InvalidRoundState {
                expected: format!("{:?}", RoundState::Active),
                actual: format!("{:?}", round.state),
            });
        }
        let now = self.time.now();
        if round.is_expired(now) {
            return Err(ConsensusError::RoundExpired {
                round_id,
                end_time: round.end_time,
                now,
            });
        }

        round.proposed_root = Some(state_root);
        round.transition_to(RoundState::Voting)?;
        drop(store);

        debug!(
            shard_id,
            round_id,
            root = %shared_types::short_hash(&state_root),
            "state proposed"
        );
        self.sink.emit(LedgerEvent::StateProposed {
            shard_id,
            round_id,
            state_root,
        });
        Ok(())
    }

    fn cast_vote(
        &self,
        shard_id: ShardId,
        round_id: RoundId,
        caller: &Address,
        support: bool,
    ) -> ConsensusResult<VoteReceipt> {
        let mut store = self.store.write();
        let slot = store
            .get_mut(&shard_id)
            .ok_or(ConsensusError::ConsensusNotConfigured(shard_id))?;
        let round = slot
            .current
            .as_mut()
            .filter(|r| r.round_id == round_id)
            .ok_or(ConsensusError::UnknownRound { shard_id, round_id })?;

        if !round.is_eligible(caller) || !self.directory.is_active_validator(shard_id, caller) {
            return Err(ConsensusError::NotShardValidator { shard_id });
        }
        if round.state != RoundState::Voting {
            return Err(ConsensusError::InvalidRoundState {
                expected: format!("{:?}", RoundState::Voting),
                actual: format!("{:?}", round.state),
            });
        }
        if round.has_voted(caller) {
            return Err(ConsensusError::AlreadyVoted { round_id });
        }
        let now = self.time.now();
        if round.is_expired(now) {
            return Err(ConsensusError::RoundExpired {
                round_id,
                end_time: round.end_time,
                now,
            });
        }

        let votes_after = round.votes_for + u32::from(support);
        let required = round.required;
        let finalizing = support && votes_after >= required;

        if !finalizing {
            round.record_vote(*caller, support);
            drop(store);

            self.sink.emit(LedgerEvent::VoteCast {
                shard_id,
                round_id,
                validator: *caller,
                support,
                votes_for: votes_after,
            });
            return Ok(VoteReceipt {
                votes_for: votes_after,
                required,
                finalized: false,
            });
        }

        // The root goes downstream before the local commit; a refusal
        // leaves the round open and this vote uncast.
        let state_root = round.proposed_root.ok_or_else(|| {
            ConsensusError::InvalidRoundState {
                expected: format!("{:?}", RoundState::Voting),
                actual: "Voting without a proposal".to_string(),
            }
        })?;
        self.roots
            .submit_root(shard_id, state_root)
            .map_err(|e| ConsensusError::RootSinkRejected(e.to_string()))?;

        round.record_vote(*caller, support);
        round.transition_to(RoundState::Finalizing)?;
        round.transition_to(RoundState::Completed)?;
        let proposer = round.proposer;
        let supporters = round.supporting_voters();
        Self::retire_round(slot, self.params.round_history_capacity);
        drop(store);

        info!(
            shard_id,
            round_id,
            votes_for = votes_after,
            required,
            root = %shared_types::short_hash(&state_root),
            "round finalized"
        );
        self.sink.emit(LedgerEvent::VoteCast {
            shard_id,
            round_id,
            validator: *caller,
            support,
            votes_for: votes_after,
        });
        self.sink.emit(LedgerEvent::RoundFinalized {
            shard_id,
            round_id,
            state_root,
            votes_for: votes_after,
            required,
        });

        self.directory.record_proposal_success(&proposer);
        self.directory.accrue_reward(&proposer, self.params.proposer_bonus);
        for voter in supporters {
            self.directory.accrue_reward(&voter, self.params.voter_base_reward);
        }

        Ok(VoteReceipt {
            votes_for: votes_after,
            required,
            finalized: true,
        })
    }

    fn mark_failed(&self, shard_id: ShardId, round_id: RoundId) -> ConsensusResult<()> {
        let mut store = self.store.write();
        let slot = store
            .get_mut(&shard_id)
            .ok_or(ConsensusError::ConsensusNotConfigured(shard_id))?;
        let round = slot
            .current
            .as_mut()
            .filter(|r| r.round_id == round_id)
            .ok_or(ConsensusError::UnknownRound { shard_id, round_id })?;

        if !round.state.is_open() {
            return Err(ConsensusError::InvalidRoundState {
                expected: "Active or Voting".to_string(),
                actual: format!("{:?}", round.state),
            });
        }
        let now = self.time.now();
        if now < round.end_time {
            return Err(ConsensusError::DeadlineNotReached {
                end_time: round.end_time,
                now,
            });
        }

        round.transition_to(RoundState::Failed)?;
        let votes_for = round.votes_for;
        let required = round.required;
        Self::retire_round(slot, self.params.round_history_capacity);
        drop(store);

        warn!(shard_id, round_id, votes_for, required, "round failed at deadline");
        self.sink.emit(LedgerEvent::RoundFailed {
            shard_id,
            round_id,
            votes_for,
            required,
        });
        Ok(())
    }

    fn current_round(&self, shard_id: ShardId) -> Option<ConsensusRound> {
        self.store
            .read()
            .get(&shard_id)
            .and_then(|slot| slot.current.clone())
    }

    fn recent_rounds(&self, shard_id: ShardId) -> Vec<ConsensusRound> {
        self.store
            .read()
            .get(&shard_id)
            .map(|slot| slot.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn is_configured(&self, shard_id: ShardId) -> bool {
        self.store.read().contains_key(&shard_id)
    }
}
