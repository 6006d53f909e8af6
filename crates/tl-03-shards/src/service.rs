//! Shard registry service: serialized writes over the shard arena.
//!
//! All validation runs before the first write of an operation, so a failed
//! call leaves no partial state. The rebalance trigger runs inside the same
//! lock scope as the load write, so target selection always sees the load
//! figure that tripped it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use shared_bus::{EventSink, LedgerEvent};
use shared_types::config::ShardParams;
use shared_types::{Address, Capability, CapabilityProbe, Hash, ShardId, TimeSource};

use crate::domain::entities::Shard;
use crate::domain::errors::{ShardError, ShardResult};
use crate::domain::invariants::{
    crosses_threshold, invariant_load_within_capacity, invariant_nonzero_capacity,
    invariant_validator_set,
};
use crate::domain::value_objects::ShardStatus;
use crate::ports::inbound::ShardRegistryApi;

#[derive(Debug, Default)]
struct ShardStore {
    shards: HashMap<ShardId, Shard>,
    next_id: ShardId,
}

/// The shard registry. Single-writer; every operation takes the store lock,
/// validates, commits, releases, then emits.
pub struct ShardRegistryService {
    store: RwLock<ShardStore>,
    params: ShardParams,
    probe: Arc<dyn CapabilityProbe>,
    sink: Arc<dyn EventSink>,
    time: Arc<dyn TimeSource>,
}

impl ShardRegistryService {
    /// Creates a registry with the given parameter set and dependencies.
    pub fn new(
        params: ShardParams,
        probe: Arc<dyn CapabilityProbe>,
        sink: Arc<dyn EventSink>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store: RwLock::new(ShardStore::default()),
            params,
            probe,
            sink,
            time,
        }
    }

    fn require_admin(&self, caller: &Address, action: &'static str) -> ShardResult<()> {
        if !self.probe.has_capability(caller, &Capability::Administrator) {
            return Err(ShardError::NotAuthorized { action });
        }
        Ok(())
    }

    fn emit_status_change(&self, shard_id: ShardId, old: ShardStatus, new: ShardStatus) {
        self.sink.emit(LedgerEvent::ShardStatusChanged {
            shard_id,
            old_status: format!("{old:?}"),
            new_status: format!("{new:?}"),
        });
    }

    /// Admin-gated status change shared by the maintenance operations.
    fn transition_shard(
        &self,
        caller: &Address,
        shard_id: ShardId,
        target: ShardStatus,
        action: &'static str,
    ) -> ShardResult<ShardStatus> {
        self.require_admin(caller, action)?;
        let mut store = self.store.write();
        let shard = store
            .shards
            .get_mut(&shard_id)
            .ok_or(ShardError::UnknownShard(shard_id))?;
        let old = shard.status;
        shard.transition_to(target)?;
        drop(store);
        self.emit_status_change(shard_id, old, target);
        Ok(old)
    }
}

impl ShardRegistryApi for ShardRegistryService {
    fn create_shard(
        &self,
        caller: &Address,
        capacity: u64,
        validators: Vec<Address>,
    ) -> ShardResult<Shard> {
        self.require_admin(caller, "create_shard")?;
        invariant_nonzero_capacity(capacity)?;
        invariant_validator_set(&validators, self.params.min_validators)?;

        let mut store = self.store.write();
        let id = store.next_id;
        let shard = Shard::new(id, capacity, validators, self.time.now());
        let validator_count = shard.validator_set.len();
        store.shards.insert(id, shard.clone());
        store.next_id += 1;
        drop(store);

        info!(shard_id = id, capacity, validator_count, "shard created");
        self.sink.emit(LedgerEvent::ShardCreated {
            shard_id: id,
            capacity,
            validator_count,
        });
        Ok(shard)
    }

    fn activate_shard(&self, caller: &Address, shard_id: ShardId) -> ShardResult<()> {
        let old = self.transition_shard(caller, shard_id, ShardStatus::Active, "activate_shard")?;
        info!(shard_id, from = ?old, "shard activated");
        Ok(())
    }

    fn update_load(
        &self,
        caller: &Address,
        shard_id: ShardId,
        new_load: u64,
    ) -> ShardResult<Option<ShardId>> {
        let mut store = self.store.write();
        let shard = store
            .shards
            .get_mut(&shard_id)
            .ok_or(ShardError::UnknownShard(shard_id))?;

        if !shard.has_validator(caller) {
            return Err(ShardError::NotShardValidator { shard_id });
        }
        if !shard.status.is_serving() {
            return Err(ShardError::NotServing {
                shard_id,
                status: format!("{:?}", shard.status),
            });
        }
        invariant_load_within_capacity(new_load, shard.capacity)?;

        let old_load = shard.load;
        shard.load = new_load;
        let capacity = shard.capacity;
        let was_active = shard.status == ShardStatus::Active;
        let last_rebalance = shard.last_rebalance;

        let now = self.time.now();
        let cooldown_over = last_rebalance
            .is_none_or(|t| now >= t + self.params.rebalance_cooldown_secs);
        let hot = crosses_threshold(new_load, capacity, self.params.rebalance_threshold_percent);

        let mut triggered = false;
        let mut target = None;
        if was_active && hot && cooldown_over {
            triggered = true;
            target = store
                .shards
                .values()
                .filter(|s| {
                    s.id != shard_id && s.status == ShardStatus::Active && s.spare_capacity() > 0
                })
                .min_by_key(|s| (s.load, s.id))
                .map(|s| s.id);
            if let Some(shard) = store.shards.get_mut(&shard_id) {
                shard.last_rebalance = Some(now);
                if target.is_some() {
                    shard.transition_to(ShardStatus::Rebalancing)?;
                }
            }
        }
        drop(store);

        self.sink.emit(LedgerEvent::ShardLoadUpdated {
            shard_id,
            old_load,
            new_load,
            capacity,
        });
        if triggered {
            warn!(shard_id, new_load, capacity, ?target, "rebalance triggered");
            self.sink.emit(LedgerEvent::RebalanceTriggered {
                shard_id,
                load: new_load,
                capacity,
                target,
            });
            if target.is_some() {
                self.emit_status_change(shard_id, ShardStatus::Active, ShardStatus::Rebalancing);
            }
        }
        Ok(target)
    }

    fn complete_rebalance(
        &self,
        caller: &Address,
        shard_id: ShardId,
        shed_load: u64,
    ) -> ShardResult<()> {
        self.require_admin(caller, "complete_rebalance")?;

        let mut store = self.store.write();
        let shard = store
            .shards
            .get_mut(&shard_id)
            .ok_or(ShardError::UnknownShard(shard_id))?;

        if shard.status != ShardStatus::Rebalancing {
            return Err(ShardError::InvalidStatus {
                expected: format!("{:?}", ShardStatus::Rebalancing),
                actual: format!("{:?}", shard.status),
            });
        }

        let old_load = shard.load;
        shard.load = shard.load.saturating_sub(shed_load);
        shard.last_rebalance = Some(self.time.now());
        shard.transition_to(ShardStatus::Active)?;
        let new_load = shard.load;
        let capacity = shard.capacity;
        drop(store);

        info!(shard_id, shed_load, new_load, "rebalance completed");
        self.sink.emit(LedgerEvent::ShardLoadUpdated {
            shard_id,
            old_load,
            new_load,
            capacity,
        });
        self.emit_status_change(shard_id, ShardStatus::Rebalancing, ShardStatus::Active);
        Ok(())
    }

    fn update_state_root(
        &self,
        caller: &Address,
        shard_id: ShardId,
        root: Hash,
    ) -> ShardResult<()> {
        let mut store = self.store.write();
        let shard = store
            .shards
            .get_mut(&shard_id)
            .ok_or(ShardError::UnknownShard(shard_id))?;

        if !shard.has_validator(caller) {
            return Err(ShardError::NotShardValidator { shard_id });
        }

        let old_root = shard.record_root(root, self.params.root_history_capacity);
        drop(store);

        debug!(shard_id, root = %shared_types::short_hash(&root), "state root updated");
        self.sink.emit(LedgerEvent::ShardRootUpdated {
            shard_id,
            old_root,
            new_root: root,
        });
        Ok(())
    }

    fn initiate_maintenance(
        &self,
        caller: &Address,
        shard_id: ShardId,
        reason: &str,
    ) -> ShardResult<()> {
        let old = self.transition_shard(
            caller,
            shard_id,
            ShardStatus::Maintenance,
            "initiate_maintenance",
        )?;
        warn!(shard_id, from = ?old, reason, "shard entered maintenance");
        Ok(())
    }

    fn restore_active(&self, caller: &Address, shard_id: ShardId) -> ShardResult<()> {
        let old = self.transition_shard(caller, shard_id, ShardStatus::Active, "restore_active")?;
        info!(shard_id, from = ?old, "shard restored to service");
        Ok(())
    }

    fn mark_degraded(&self, caller: &Address, shard_id: ShardId) -> ShardResult<()> {
        let old = self.transition_shard(caller, shard_id, ShardStatus::Degraded, "mark_degraded")?;
        warn!(shard_id, from = ?old, "shard marked degraded");
        Ok(())
    }

    fn shard(&self, shard_id: ShardId) -> Option<Shard> {
        self.store.read().shards.get(&shard_id).cloned()
    }

    fn shards(&self) -> Vec<Shard> {
        let store = self.store.read();
        let mut out: Vec<Shard> = store.shards.values().cloned().collect();
        out.sort_by_key(|s| s.id);
        out
    }

    fn shard_count(&self) -> usize {
        self.store.read().shards.len()
    }
}
