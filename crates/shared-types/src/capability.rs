//! # Capability Probe
//!
//! Authorization is decided by an injected predicate, not by roles stored on
//! entities. Each service holds a `dyn CapabilityProbe` and asks it before
//! any write the call interface gates on a role.
//!
//! The runtime wires a [`StaticCapabilityTable`] with operator grants; tests
//! wire the same table with explicit grants. Shard and channel membership are
//! enforced against entity state, not the probe, so those variants matter
//! only to deployments that gate extra surfaces on them.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::entities::{Address, ChannelId, ShardId};

/// A role an actor may hold for the duration of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Operator of the deployment; may override statuses and sweep deadlines.
    Administrator,
    /// Active validator assigned to the given shard.
    ShardValidator(ShardId),
    /// Member of the given channel's participant list.
    ChannelParticipant(ChannelId),
}

/// Predicate deciding whether an actor currently holds a capability.
pub trait CapabilityProbe: Send + Sync {
    /// `true` if `actor` holds `capability` at the time of the call.
    fn has_capability(&self, actor: &Address, capability: &Capability) -> bool;
}

/// In-memory grant table.
///
/// Grants are explicit and do not expire; revocation removes a single grant.
/// Suitable for tests and for static deployments where membership changes go
/// through an operator.
#[derive(Debug, Default)]
pub struct StaticCapabilityTable {
    grants: RwLock<HashMap<Address, HashSet<Capability>>>,
}

impl StaticCapabilityTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `capability` to `actor`.
    pub fn grant(&self, actor: Address, capability: Capability) {
        self.grants.write().entry(actor).or_default().insert(capability);
    }

    /// Remove a single grant. Unknown grants are ignored.
    pub fn revoke(&self, actor: &Address, capability: &Capability) {
        if let Some(held) = self.grants.write().get_mut(actor) {
            held.remove(capability);
        }
    }
}

impl CapabilityProbe for StaticCapabilityTable {
    fn has_capability(&self, actor: &Address, capability: &Capability) -> bool {
        self.grants
            .read()
            .get(actor)
            .is_some_and(|held| held.contains(capability))
    }
}
