//! Registry-backed membership adapters.
//!
//! The consensus engine and the channel bridge both need to ask who the
//! validators are, but neither may link the registry crate's domain. These
//! adapters answer their outbound ports from the live [`RegistryService`].

use std::sync::Arc;

use tracing::warn;

use shared_types::{short_addr, Address, Amount, ShardId};
use tl_01_validators::{RegistryService, ValidatorRegistryApi};
use tl_02_consensus::ValidatorDirectory;
use tl_05_bridge::ValidatorCensus;

/// [`ValidatorDirectory`] serving the consensus engine from the registry.
pub struct RegistryDirectory {
    registry: Arc<RegistryService>,
}

impl RegistryDirectory {
    /// Wraps a registry handle.
    pub fn new(registry: Arc<RegistryService>) -> Self {
        Self { registry }
    }
}

impl ValidatorDirectory for RegistryDirectory {
    fn active_validators(&self, shard_id: ShardId) -> Vec<Address> {
        // Already sorted by identity on the registry side.
        self.registry
            .active_validators_of_shard(shard_id)
            .into_iter()
            .map(|v| v.identity)
            .collect()
    }

    fn is_active_validator(&self, shard_id: ShardId, who: &Address) -> bool {
        self.registry
            .active_validators_of_shard(shard_id)
            .iter()
            .any(|v| v.identity == *who)
    }

    fn record_proposal_success(&self, identity: &Address) {
        // The port is infallible: a finalized round must not unwind over a
        // bookkeeping refusal, so refusals are logged and dropped here.
        if let Err(e) = self.registry.record_proposal_success(identity) {
            warn!(
                validator = %short_addr(identity),
                error = %e,
                "proposal credit dropped"
            );
        }
    }

    fn accrue_reward(&self, identity: &Address, amount: Amount) {
        if let Err(e) = self.registry.accrue_reward(identity, amount) {
            warn!(
                validator = %short_addr(identity),
                amount,
                error = %e,
                "reward accrual dropped"
            );
        }
    }
}

/// [`ValidatorCensus`] serving the bridge's dispute arbitration from the
/// registry.
pub struct RegistryCensus {
    registry: Arc<RegistryService>,
}

impl RegistryCensus {
    /// Wraps a registry handle.
    pub fn new(registry: Arc<RegistryService>) -> Self {
        Self { registry }
    }
}

impl ValidatorCensus for RegistryCensus {
    fn registered_count(&self) -> usize {
        self.registry.registered_count()
    }

    fn is_registered(&self, who: &Address) -> bool {
        self.registry.is_registered(who)
    }
}
