//! Registry service: serialized writes over the validator arena.
//!
//! All validation runs before the first write of an operation, so a failed
//! call leaves no partial state. Custody effects go through the stake vault
//! before the local commit; a vault refusal aborts the whole operation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use shared_bus::{EventSink, LedgerEvent};
use shared_types::config::ValidatorParams;
use shared_types::{
    Address, Amount, BasisPoints, Capability, CapabilityProbe, PublicKey, ShardId, TimeSource,
};

use crate::domain::entities::{ShardAssignment, Validator};
use crate::domain::errors::{ValidatorError, ValidatorResult};
use crate::domain::invariants::{
    invariant_commission_within_cap, invariant_score_in_range, invariant_stake_sufficient,
};
use crate::domain::value_objects::ValidatorStatus;
use crate::ports::inbound::ValidatorRegistryApi;
use crate::ports::outbound::StakeVault;

/// One write lock guards both maps so assignment counts never drift from
/// the validators that produced them.
#[derive(Debug, Default)]
struct RegistryStore {
    validators: HashMap<Address, Validator>,
    assignment_counts: HashMap<ShardId, usize>,
}

/// The validator registry. Single-writer; every operation takes the store
/// lock, validates, commits, releases, then emits.
pub struct RegistryService {
    store: RwLock<RegistryStore>,
    params: ValidatorParams,
    probe: Arc<dyn CapabilityProbe>,
    vault: Arc<dyn StakeVault>,
    sink: Arc<dyn EventSink>,
    time: Arc<dyn TimeSource>,
}

impl RegistryService {
    /// Creates a registry with the given parameter set and dependencies.
    pub fn new(
        params: ValidatorParams,
        probe: Arc<dyn CapabilityProbe>,
        vault: Arc<dyn StakeVault>,
        sink: Arc<dyn EventSink>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store: RwLock::new(RegistryStore::default()),
            params,
            probe,
            vault,
            sink,
            time,
        }
    }

    fn require_admin(&self, caller: &Address, action: &'static str) -> ValidatorResult<()> {
        if !self.probe.has_capability(caller, &Capability::Administrator) {
            return Err(ValidatorError::NotAuthorized { action });
        }
        Ok(())
    }

    fn emit_status_change(&self, identity: &Address, old: ValidatorStatus, new: ValidatorStatus) {
        self.sink.emit(LedgerEvent::ValidatorStatusChanged {
            identity: *identity,
            old_status: format!("{old:?}"),
            new_status: format!("{new:?}"),
        });
    }
}

impl ValidatorRegistryApi for RegistryService {
    fn register(
        &self,
        identity: Address,
        public_key: PublicKey,
        stake: Amount,
        commission_bps: BasisPoints,
    ) -> ValidatorResult<Validator> {
        invariant_commission_within_cap(commission_bps, self.params.max_commission_bps)?;
        invariant_stake_sufficient(stake, self.params.min_stake)?;

        let mut store = self.store.write();
        if store.validators.contains_key(&identity) {
            return Err(ValidatorError::AlreadyRegistered(identity));
        }

        self.vault
            .lock_stake(&identity, stake)
            .map_err(|e| ValidatorError::VaultRejected(e.to_string()))?;

        let validator = Validator::new(identity, public_key, stake, commission_bps, self.time.now());
        store.validators.insert(identity, validator.clone());
        drop(store);

        info!(identity = %shared_types::short_addr(&identity), stake, "validator registered");
        self.sink.emit(LedgerEvent::ValidatorRegistered {
            identity,
            stake,
            commission_bps,
        });
        Ok(validator)
    }

    fn activate(&self, identity: &Address) -> ValidatorResult<()> {
        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;

        if validator.status != ValidatorStatus::Pending {
            return Err(ValidatorError::InvalidStatus {
                expected: format!("{:?}", ValidatorStatus::Pending),
                actual: format!("{:?}", validator.status),
            });
        }
        // A pending validator that withdrew its stake cannot come online.
        invariant_stake_sufficient(validator.stake, self.params.min_stake)?;

        validator.transition_to(ValidatorStatus::Active)?;
        drop(store);

        info!(identity = %shared_types::short_addr(identity), "validator activated");
        self.emit_status_change(identity, ValidatorStatus::Pending, ValidatorStatus::Active);
        Ok(())
    }

    fn assign_to_shard(
        &self,
        caller: &Address,
        identity: &Address,
        shard_id: ShardId,
    ) -> ValidatorResult<()> {
        self.require_admin(caller, "assign_to_shard")?;

        let mut store = self.store.write();
        let occupied = store.assignment_counts.get(&shard_id).copied().unwrap_or(0);
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;

        if validator.status != ValidatorStatus::Active {
            return Err(ValidatorError::InvalidStatus {
                expected: format!("{:?}", ValidatorStatus::Active),
                actual: format!("{:?}", validator.status),
            });
        }
        if validator.is_assigned_to(shard_id) {
            return Err(ValidatorError::AlreadyAssigned { shard_id });
        }
        if occupied >= self.params.max_validators_per_shard {
            return Err(ValidatorError::ShardFull {
                shard_id,
                cap: self.params.max_validators_per_shard,
            });
        }

        validator
            .assignments
            .push(ShardAssignment::new(shard_id, self.time.now()));
        *store.assignment_counts.entry(shard_id).or_insert(0) += 1;
        drop(store);

        debug!(identity = %shared_types::short_addr(identity), shard_id, "validator assigned");
        self.sink.emit(LedgerEvent::ValidatorAssigned {
            identity: *identity,
            shard_id,
        });
        Ok(())
    }

    fn update_performance(
        &self,
        caller: &Address,
        identity: &Address,
        shard_id: ShardId,
        score: u8,
    ) -> ValidatorResult<()> {
        self.require_admin(caller, "update_performance")?;
        invariant_score_in_range(score)?;

        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;
        let assignment = validator
            .assignment_mut(shard_id)
            .ok_or(ValidatorError::NotAssigned { shard_id })?;

        let old_score = assignment.performance_score;
        assignment.performance_score = score;
        drop(store);

        self.sink.emit(LedgerEvent::PerformanceUpdated {
            identity: *identity,
            shard_id,
            old_score,
            new_score: score,
        });
        Ok(())
    }

    fn slash(&self, caller: &Address, identity: &Address, reason: &str) -> ValidatorResult<Amount> {
        self.require_admin(caller, "slash")?;

        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;

        if validator.status != ValidatorStatus::Active {
            return Err(ValidatorError::InvalidStatus {
                expected: format!("{:?}", ValidatorStatus::Active),
                actual: format!("{:?}", validator.status),
            });
        }

        let penalty = validator.stake * Amount::from(self.params.slash_fraction_bps) / 10_000;
        self.vault
            .burn_stake(identity, penalty)
            .map_err(|e| ValidatorError::VaultRejected(e.to_string()))?;

        validator.stake -= penalty;
        let remaining = validator.stake;
        validator.transition_to(ValidatorStatus::Slashed)?;
        let freed: Vec<ShardId> = validator.assignments.iter().map(|a| a.shard_id).collect();

        // Assignments of a slashed validator no longer count against shard caps.
        for shard_id in freed {
            if let Some(count) = store.assignment_counts.get_mut(&shard_id) {
                *count = count.saturating_sub(1);
            }
        }
        drop(store);

        warn!(
            identity = %shared_types::short_addr(identity),
            penalty,
            reason,
            "validator slashed"
        );
        self.sink.emit(LedgerEvent::ValidatorSlashed {
            identity: *identity,
            penalty,
            remaining_stake: remaining,
            reason: reason.to_string(),
        });
        self.emit_status_change(identity, ValidatorStatus::Active, ValidatorStatus::Slashed);
        Ok(penalty)
    }

    fn jail(&self, caller: &Address, identity: &Address) -> ValidatorResult<u64> {
        self.require_admin(caller, "jail")?;

        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;

        if validator.status != ValidatorStatus::Active {
            return Err(ValidatorError::InvalidStatus {
                expected: format!("{:?}", ValidatorStatus::Active),
                actual: format!("{:?}", validator.status),
            });
        }

        let until = self.time.now() + self.params.jail_duration_secs;
        validator.transition_to(ValidatorStatus::Jailed)?;
        validator.jailed_until = Some(until);
        drop(store);

        warn!(identity = %shared_types::short_addr(identity), until, "validator jailed");
        self.sink.emit(LedgerEvent::ValidatorJailed {
            identity: *identity,
            jailed_until: until,
        });
        self.emit_status_change(identity, ValidatorStatus::Active, ValidatorStatus::Jailed);
        Ok(until)
    }

    fn release_from_jail(&self, identity: &Address) -> ValidatorResult<()> {
        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;

        if validator.status != ValidatorStatus::Jailed {
            return Err(ValidatorError::InvalidStatus {
                expected: format!("{:?}", ValidatorStatus::Jailed),
                actual: format!("{:?}", validator.status),
            });
        }

        let now = self.time.now();
        let until = validator.jailed_until.unwrap_or(0);
        if now < until {
            return Err(ValidatorError::JailNotElapsed { now, until });
        }

        validator.transition_to(ValidatorStatus::Active)?;
        validator.jailed_until = None;
        drop(store);

        info!(identity = %shared_types::short_addr(identity), "validator released from jail");
        self.emit_status_change(identity, ValidatorStatus::Jailed, ValidatorStatus::Active);
        Ok(())
    }

    fn withdraw_stake(&self, identity: &Address) -> ValidatorResult<Amount> {
        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;

        if !matches!(
            validator.status,
            ValidatorStatus::Pending | ValidatorStatus::Slashed
        ) {
            return Err(ValidatorError::InvalidStatus {
                expected: "Pending or Slashed".to_string(),
                actual: format!("{:?}", validator.status),
            });
        }

        let amount = validator.stake;
        self.vault
            .release_stake(identity, amount)
            .map_err(|e| ValidatorError::VaultRejected(e.to_string()))?;
        validator.stake = 0;
        drop(store);

        info!(identity = %shared_types::short_addr(identity), amount, "stake withdrawn");
        self.sink.emit(LedgerEvent::StakeWithdrawn {
            identity: *identity,
            amount,
        });
        Ok(amount)
    }

    fn record_proposal_success(&self, identity: &Address) -> ValidatorResult<u64> {
        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;
        validator.successful_proposals += 1;
        Ok(validator.successful_proposals)
    }

    fn accrue_reward(&self, identity: &Address, amount: Amount) -> ValidatorResult<Amount> {
        let mut store = self.store.write();
        let validator = store
            .validators
            .get_mut(identity)
            .ok_or(ValidatorError::UnknownValidator(*identity))?;
        validator.accrued_rewards = validator.accrued_rewards.saturating_add(amount);
        let total = validator.accrued_rewards;
        drop(store);

        self.sink.emit(LedgerEvent::RewardAccrued {
            identity: *identity,
            amount,
            total,
        });
        Ok(total)
    }

    fn validator(&self, identity: &Address) -> Option<Validator> {
        self.store.read().validators.get(identity).cloned()
    }

    fn active_validators_of_shard(&self, shard_id: ShardId) -> Vec<Validator> {
        let store = self.store.read();
        let mut out: Vec<Validator> = store
            .validators
            .values()
            .filter(|v| v.is_participating() && v.is_assigned_to(shard_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.identity.cmp(&b.identity));
        out
    }

    fn active_validators(&self) -> Vec<Validator> {
        let store = self.store.read();
        let mut out: Vec<Validator> = store
            .validators
            .values()
            .filter(|v| v.is_participating())
            .cloned()
            .collect();
        out.sort_by(|a, b| a.identity.cmp(&b.identity));
        out
    }

    fn is_registered(&self, identity: &Address) -> bool {
        self.store.read().validators.contains_key(identity)
    }

    fn registered_count(&self) -> usize {
        self.store.read().validators.len()
    }
}
