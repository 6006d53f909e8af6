//! Consensus round lifecycle across the live registry and shard registry.
//!
//! The engine here reads its electorate from tl-01 through the runtime
//! directory and pushes finalized roots into tl-03 through the runtime root
//! sink, so these tests cover the full finalization pipeline: registry to
//! round to shard to reward bookkeeping.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::{Address, ManualTimeSource, ShardId};
    use tl_01_validators::ValidatorRegistryApi;
    use tl_02_consensus::{ConsensusApi, ConsensusError, RoundState};
    use tl_03_shards::ShardRegistryApi;

    use node_runtime::{NodeConfig, SubsystemContainer};

    const START: u64 = 1_000_000;

    /// Four identities in ascending order, matching the default minimum
    /// validator count.
    const COMMITTEE: [Address; 4] = [[0x11; 20], [0x22; 20], [0x33; 20], [0x44; 20]];

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn live_container() -> (SubsystemContainer, Arc<ManualTimeSource>) {
        let time = ManualTimeSource::starting_at(START);
        let container = SubsystemContainer::with_clock(NodeConfig::default(), time.clone());
        (container, time)
    }

    /// Registers the committee, forms one shard around it, and configures
    /// consensus on it. Returns the shard id.
    fn committee_shard(container: &SubsystemContainer) -> ShardId {
        let operator = container.config.operator;
        for identity in COMMITTEE {
            container
                .registry
                .register(identity, [0x0f; 32], 2_000, 500)
                .unwrap();
            container.registry.activate(&identity).unwrap();
        }
        let shard = container
            .shards
            .create_shard(&operator, 1_000, COMMITTEE.to_vec())
            .unwrap();
        container.shards.activate_shard(&operator, shard.id).unwrap();
        for identity in COMMITTEE {
            container
                .registry
                .assign_to_shard(&operator, &identity, shard.id)
                .unwrap();
        }
        container.consensus.configure_shard(&operator, shard.id).unwrap();
        shard.id
    }

    // =========================================================================
    // FINALIZATION PIPELINE
    // =========================================================================

    #[test]
    fn test_finalized_root_lands_in_the_shard_registry() {
        let (container, _) = live_container();
        let shard_id = committee_shard(&container);

        let round = container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        // Round ids start at 1, so the deterministic proposer is the second
        // identity of the sorted electorate.
        assert_eq!(round.round_id, 1);
        assert_eq!(round.proposer, COMMITTEE[1]);
        assert_eq!(round.eligible, COMMITTEE.to_vec());
        assert_eq!(round.required, 3);

        let root = [0xab; 32];
        container
            .consensus
            .propose_state(shard_id, 1, root, &round.proposer)
            .unwrap();

        // Two supporting votes leave the round open.
        let receipt = container
            .consensus
            .cast_vote(shard_id, 1, &COMMITTEE[1], true)
            .unwrap();
        assert!(!receipt.finalized);
        let receipt = container
            .consensus
            .cast_vote(shard_id, 1, &COMMITTEE[0], true)
            .unwrap();
        assert!(!receipt.finalized);
        assert!(container.shards.shard(shard_id).unwrap().state_root.is_none());

        // The third crosses the threshold and pushes the root downstream.
        let receipt = container
            .consensus
            .cast_vote(shard_id, 1, &COMMITTEE[2], true)
            .unwrap();
        assert!(receipt.finalized);
        assert_eq!(receipt.votes_for, 3);

        assert_eq!(container.shards.shard(shard_id).unwrap().state_root, Some(root));
        assert!(container.consensus.current_round(shard_id).is_none());
        assert_eq!(
            container.consensus.recent_rounds(shard_id)[0].state,
            RoundState::Completed
        );
    }

    #[test]
    fn test_finalization_accrues_rewards_in_the_registry() {
        let (container, _) = live_container();
        let shard_id = committee_shard(&container);

        let round = container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        container
            .consensus
            .propose_state(shard_id, 1, [0xab; 32], &round.proposer)
            .unwrap();
        for identity in [COMMITTEE[1], COMMITTEE[0], COMMITTEE[2]] {
            container.consensus.cast_vote(shard_id, 1, &identity, true).unwrap();
        }

        // Defaults: proposer bonus 50, voter base 10. COMMITTEE[1] proposed
        // and voted, the other two supporters voted, COMMITTEE[3] abstained.
        let proposer = container.registry.validator(&COMMITTEE[1]).unwrap();
        assert_eq!(proposer.successful_proposals, 1);
        assert_eq!(proposer.accrued_rewards, 60);
        assert_eq!(
            container.registry.validator(&COMMITTEE[0]).unwrap().accrued_rewards,
            10
        );
        assert_eq!(
            container.registry.validator(&COMMITTEE[3]).unwrap().accrued_rewards,
            0
        );
    }

    // =========================================================================
    // ROUND INVARIANTS
    // =========================================================================

    #[test]
    fn test_one_open_round_per_shard() {
        let (container, _) = live_container();
        let shard_id = committee_shard(&container);

        container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        let err = container
            .consensus
            .start_round(shard_id, &COMMITTEE[1])
            .unwrap_err();
        assert_eq!(err, ConsensusError::RoundInProgress { shard_id, round_id: 1 });
    }

    #[test]
    fn test_votes_count_once() {
        let (container, _) = live_container();
        let shard_id = committee_shard(&container);

        let round = container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        container
            .consensus
            .propose_state(shard_id, 1, [0xab; 32], &round.proposer)
            .unwrap();

        container.consensus.cast_vote(shard_id, 1, &COMMITTEE[0], true).unwrap();
        let err = container
            .consensus
            .cast_vote(shard_id, 1, &COMMITTEE[0], true)
            .unwrap_err();
        assert_eq!(err, ConsensusError::AlreadyVoted { round_id: 1 });

        // The rejected second cast left the total untouched.
        assert_eq!(container.consensus.current_round(shard_id).unwrap().votes_for, 1);
    }

    #[test]
    fn test_opposing_votes_do_not_finalize() {
        let (container, _) = live_container();
        let shard_id = committee_shard(&container);

        let round = container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        container
            .consensus
            .propose_state(shard_id, 1, [0xab; 32], &round.proposer)
            .unwrap();

        for identity in &COMMITTEE[..3] {
            let receipt = container
                .consensus
                .cast_vote(shard_id, 1, identity, false)
                .unwrap();
            assert_eq!(receipt.votes_for, 0);
            assert!(!receipt.finalized);
        }
        assert!(container.shards.shard(shard_id).unwrap().state_root.is_none());
    }

    #[test]
    fn test_outsiders_cannot_vote() {
        let (container, _) = live_container();
        let shard_id = committee_shard(&container);

        let round = container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        container
            .consensus
            .propose_state(shard_id, 1, [0xab; 32], &round.proposer)
            .unwrap();

        let err = container
            .consensus
            .cast_vote(shard_id, 1, &[0x99; 20], true)
            .unwrap_err();
        assert_eq!(err, ConsensusError::NotShardValidator { shard_id });
    }

    // =========================================================================
    // DEADLINES
    // =========================================================================

    #[test]
    fn test_expired_round_fails_and_frees_the_shard() {
        let (container, time) = live_container();
        let shard_id = committee_shard(&container);

        let round = container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        container
            .consensus
            .propose_state(shard_id, 1, [0xab; 32], &round.proposer)
            .unwrap();
        container.consensus.cast_vote(shard_id, 1, &COMMITTEE[0], true).unwrap();

        // The sweep cannot fail a round whose budget still runs.
        let err = container.consensus.mark_failed(shard_id, 1).unwrap_err();
        assert!(matches!(err, ConsensusError::DeadlineNotReached { .. }));

        time.advance(31);

        // Past the deadline the remaining votes bounce and the only exit is
        // failure; no root ever reaches the shard.
        let err = container
            .consensus
            .cast_vote(shard_id, 1, &COMMITTEE[2], true)
            .unwrap_err();
        assert!(matches!(err, ConsensusError::RoundExpired { .. }));

        container.consensus.mark_failed(shard_id, 1).unwrap();
        assert!(container.shards.shard(shard_id).unwrap().state_root.is_none());
        assert_eq!(
            container.consensus.recent_rounds(shard_id)[0].state,
            RoundState::Failed
        );

        // The shard is free for a fresh attempt with the next id.
        let next = container.consensus.start_round(shard_id, &COMMITTEE[0]).unwrap();
        assert_eq!(next.round_id, 2);
        assert_eq!(next.proposer, COMMITTEE[2]);
    }
}
