//! Shard load reporting and the rebalance trigger.
//!
//! Load figures come in from shard validators; the registry decides when a
//! shard is hot enough to shed load and which peer should absorb it. The
//! journal doubles as the assertion surface for trigger-without-target
//! cases, which are invisible in the return value alone.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_bus::LedgerEvent;
    use shared_types::{Address, ManualTimeSource};
    use tl_03_shards::{ShardError, ShardRegistryApi, ShardStatus};

    use node_runtime::{NodeConfig, SubsystemContainer};

    const START: u64 = 1_000_000;
    const VALIDATORS: [Address; 4] = [[0x11; 20], [0x22; 20], [0x33; 20], [0x44; 20]];

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn live_container() -> (SubsystemContainer, Arc<ManualTimeSource>) {
        let time = ManualTimeSource::starting_at(START);
        let container = SubsystemContainer::with_clock(NodeConfig::default(), time.clone());
        (container, time)
    }

    /// One Active shard of capacity 1000 served by [`VALIDATORS`].
    fn active_shard(container: &SubsystemContainer) -> u16 {
        let operator = container.config.operator;
        let shard = container
            .shards
            .create_shard(&operator, 1_000, VALIDATORS.to_vec())
            .unwrap();
        container.shards.activate_shard(&operator, shard.id).unwrap();
        shard.id
    }

    // =========================================================================
    // REBALANCE TRIGGER
    // =========================================================================

    #[test]
    fn test_hot_shard_rebalances_toward_the_idle_peer() {
        let (container, _) = live_container();
        let hot = active_shard(&container);
        let idle = active_shard(&container);

        // 95% load against a 75% threshold, cooldown never consumed.
        let target = container
            .shards
            .update_load(&VALIDATORS[0], hot, 950)
            .unwrap();
        assert_eq!(target, Some(idle));

        let shard = container.shards.shard(hot).unwrap();
        assert_eq!(shard.status, ShardStatus::Rebalancing);
        assert_eq!(shard.load, 950);
        assert_eq!(shard.last_rebalance, Some(START));

        // The chosen peer keeps serving untouched.
        assert_eq!(container.shards.shard(idle).unwrap().status, ShardStatus::Active);

        container.shards.complete_rebalance(&container.config.operator, hot, 400).unwrap();
        let shard = container.shards.shard(hot).unwrap();
        assert_eq!(shard.status, ShardStatus::Active);
        assert_eq!(shard.load, 550);
    }

    #[test]
    fn test_load_below_threshold_never_triggers() {
        let (container, _) = live_container();
        let hot = active_shard(&container);
        let _idle = active_shard(&container);

        // 60% < 75%.
        let target = container
            .shards
            .update_load(&VALIDATORS[0], hot, 600)
            .unwrap();
        assert_eq!(target, None);
        assert_eq!(container.shards.shard(hot).unwrap().status, ShardStatus::Active);
        assert!(container.shards.shard(hot).unwrap().last_rebalance.is_none());
    }

    #[test]
    fn test_trigger_without_a_target_keeps_serving() {
        let (container, _) = live_container();
        let lonely = active_shard(&container);

        let target = container
            .shards
            .update_load(&VALIDATORS[0], lonely, 950)
            .unwrap();
        assert_eq!(target, None);

        // The search ran and found nothing: the trigger is on the journal
        // and the cooldown clock started, but the shard cannot shed.
        assert_eq!(container.shards.shard(lonely).unwrap().status, ShardStatus::Active);
        assert_eq!(container.shards.shard(lonely).unwrap().last_rebalance, Some(START));
        assert!(container.journal.events_since(0).iter().any(|e| matches!(
            e.event,
            LedgerEvent::RebalanceTriggered { shard_id, target: None, .. } if shard_id == lonely
        )));
    }

    // =========================================================================
    // COOLDOWN
    // =========================================================================

    #[test]
    fn test_cooldown_spaces_rebalance_attempts() {
        let (container, time) = live_container();
        let hot = active_shard(&container);
        let _idle = active_shard(&container);

        assert!(container
            .shards
            .update_load(&VALIDATORS[0], hot, 950)
            .unwrap()
            .is_some());
        container.shards.complete_rebalance(&container.config.operator, hot, 400).unwrap();

        // Hot again immediately: the trigger is still cooling down.
        let target = container
            .shards
            .update_load(&VALIDATORS[0], hot, 900)
            .unwrap();
        assert_eq!(target, None);
        assert_eq!(container.shards.shard(hot).unwrap().status, ShardStatus::Active);

        // Default cooldown is 300 seconds.
        time.advance(301);
        let target = container
            .shards
            .update_load(&VALIDATORS[0], hot, 910)
            .unwrap();
        assert!(target.is_some());
        assert_eq!(
            container.shards.shard(hot).unwrap().status,
            ShardStatus::Rebalancing
        );
    }

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    #[test]
    fn test_only_shard_validators_report_load() {
        let (container, _) = live_container();
        let shard_id = active_shard(&container);

        let err = container
            .shards
            .update_load(&[0x99; 20], shard_id, 500)
            .unwrap_err();
        assert_eq!(err, ShardError::NotShardValidator { shard_id });
    }

    #[test]
    fn test_load_cannot_exceed_capacity() {
        let (container, _) = live_container();
        let shard_id = active_shard(&container);

        let err = container
            .shards
            .update_load(&VALIDATORS[0], shard_id, 1_001)
            .unwrap_err();
        assert_eq!(err, ShardError::CapacityExceeded { load: 1_001, capacity: 1_000 });
    }
}
