//! Channel bridge service: the on-ledger anchor for off-chain channels.
//!
//! All validation runs before the first write of an operation, so a failed
//! call leaves no partial state. Signature recovery happens inside the lock
//! scope, so the participant set a signature is checked against is the one
//! the commit will see.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use shared_bus::{EventSink, LedgerEvent};
use shared_types::config::BridgeParams;
use shared_types::{short_hash, Address, Amount, ChannelId, Hash, Signature, TimeSource};

use crate::domain::entities::{BridgeChannel, Dispute};
use crate::domain::errors::{BridgeError, BridgeResult};
use crate::domain::invariants::{
    derive_channel_id, invariant_nonzero_capacity, invariant_participant_set, resolution_digest,
    supermajority, update_digest,
};
use crate::domain::value_objects::{DisputeStatus, StateUpdate};
use crate::ports::inbound::ChannelBridgeApi;
use crate::ports::outbound::{SignatureVerifier, ValidatorCensus};

#[derive(Debug, Default)]
struct BridgeStore {
    channels: HashMap<ChannelId, BridgeChannel>,
}

impl BridgeStore {
    /// The channel, which must exist and still be active.
    fn active_channel_mut(&mut self, id: &ChannelId) -> BridgeResult<&mut BridgeChannel> {
        let channel = self
            .channels
            .get_mut(id)
            .ok_or(BridgeError::UnknownChannel(*id))?;
        if !channel.active {
            return Err(BridgeError::ChannelInactive(*id));
        }
        Ok(channel)
    }
}

/// The channel bridge. Single-writer; every operation takes the store lock,
/// validates, commits, releases, then emits.
pub struct ChannelBridgeService {
    store: RwLock<BridgeStore>,
    params: BridgeParams,
    verifier: Arc<dyn SignatureVerifier>,
    census: Arc<dyn ValidatorCensus>,
    sink: Arc<dyn EventSink>,
    time: Arc<dyn TimeSource>,
}

impl ChannelBridgeService {
    /// Creates a bridge with the given parameter set and dependencies.
    pub fn new(
        params: BridgeParams,
        verifier: Arc<dyn SignatureVerifier>,
        census: Arc<dyn ValidatorCensus>,
        sink: Arc<dyn EventSink>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store: RwLock::new(BridgeStore::default()),
            params,
            verifier,
            census,
            sink,
            time,
        }
    }

    /// Recovers each signer over `digest` and checks it against `eligible`.
    /// Signers must be distinct; the index of the first bad signature is
    /// reported.
    fn recover_signers(
        &self,
        digest: &Hash,
        signatures: &[Signature],
        eligible: &[Address],
    ) -> BridgeResult<Vec<Address>> {
        let mut signers: Vec<Address> = Vec::with_capacity(signatures.len());
        for (index, signature) in signatures.iter().enumerate() {
            let signer = self
                .verifier
                .recover(digest, signature)
                .ok_or(BridgeError::InvalidSignature { index })?;
            if !eligible.contains(&signer) || signers.contains(&signer) {
                return Err(BridgeError::InvalidSignature { index });
            }
            signers.push(signer);
        }
        Ok(signers)
    }
}

impl ChannelBridgeApi for ChannelBridgeService {
    fn register_channel(
        &self,
        participants: Vec<Address>,
        capacity: Amount,
        opened_at: u64,
    ) -> BridgeResult<ChannelId> {
        invariant_participant_set(&participants)?;
        invariant_nonzero_capacity(capacity)?;
        let id = derive_channel_id(&participants, capacity, opened_at);

        let mut store = self.store.write();
        if store.channels.contains_key(&id) {
            return Err(BridgeError::ChannelExists(id));
        }
        let channel = BridgeChannel::new(id, participants.clone(), capacity, opened_at);
        store.channels.insert(id, channel);
        drop(store);

        info!(
            channel = %short_hash(&id),
            participants = participants.len(),
            capacity,
            "channel registered"
        );
        self.sink.emit(LedgerEvent::BridgeChannelRegistered {
            channel_id: id,
            participants,
            capacity,
        });
        Ok(id)
    }

    fn update_channel_state(&self, update: StateUpdate) -> BridgeResult<()> {
        let mut store = self.store.write();
        let channel = store.active_channel_mut(&update.channel_id)?;
        if let Some(d) = &channel.dispute {
            // Updates freeze while a dispute is open.
            if d.status == DisputeStatus::Initiated {
                return Err(BridgeError::DisputeAlreadyOpen {
                    window_ends_at: d.window_ends_at,
                });
            }
        }
        if update.signatures.len() != channel.participants.len() {
            return Err(BridgeError::SignatureCountMismatch {
                got: update.signatures.len(),
                required: channel.participants.len(),
            });
        }
        if update.sequence <= channel.sequence {
            return Err(BridgeError::StaleSequence {
                proposed: update.sequence,
                current: channel.sequence,
            });
        }

        // One signature per participant and no repeats: full coverage.
        let digest = update_digest(&update.channel_id, &update.state_hash, update.sequence);
        self.recover_signers(&digest, &update.signatures, &channel.participants)?;

        channel.latest_state_hash = Some(update.state_hash);
        channel.sequence = update.sequence;
        drop(store);

        debug!(
            channel = %short_hash(&update.channel_id),
            sequence = update.sequence,
            "state update anchored"
        );
        self.sink.emit(LedgerEvent::ChannelStateUpdated {
            channel_id: update.channel_id,
            state_hash: update.state_hash,
            sequence: update.sequence,
        });
        Ok(())
    }

    fn initiate_dispute(
        &self,
        channel_id: ChannelId,
        disputant: Address,
        proof: Vec<u8>,
    ) -> BridgeResult<()> {
        let now = self.time.now();
        let window_ends_at = now + self.params.dispute_window_secs;

        let mut store = self.store.write();
        let channel = store.active_channel_mut(&channel_id)?;
        if !channel.has_participant(&disputant) {
            return Err(BridgeError::NotParticipant);
        }
        if let Some(d) = &channel.dispute {
            if d.status == DisputeStatus::Initiated {
                return Err(BridgeError::DisputeAlreadyOpen {
                    window_ends_at: d.window_ends_at,
                });
            }
        }
        channel.dispute = Some(Dispute {
            disputant,
            proof,
            opened_at: now,
            window_ends_at,
            status: DisputeStatus::Initiated,
        });
        drop(store);

        warn!(
            channel = %short_hash(&channel_id),
            window_ends_at,
            "dispute opened"
        );
        self.sink.emit(LedgerEvent::DisputeInitiated {
            channel_id,
            disputant,
            window_ends_at,
        });
        Ok(())
    }

    fn resolve_dispute(
        &self,
        channel_id: ChannelId,
        final_state_hash: Hash,
        validator_signatures: Vec<Signature>,
    ) -> BridgeResult<()> {
        let now = self.time.now();

        let mut store = self.store.write();
        let channel = store.active_channel_mut(&channel_id)?;
        let ends_at = match &channel.dispute {
            Some(d) if d.status == DisputeStatus::Initiated => d.window_ends_at,
            _ => return Err(BridgeError::DisputeNotOpen),
        };
        if now < ends_at {
            return Err(BridgeError::DisputeWindowOpen { ends_at });
        }

        // Distinct registered validators, counted once each regardless of
        // how many copies arrive.
        let digest = resolution_digest(&channel_id, &final_state_hash);
        let mut signers: Vec<Address> = Vec::new();
        for (index, signature) in validator_signatures.iter().enumerate() {
            let signer = self
                .verifier
                .recover(&digest, signature)
                .ok_or(BridgeError::InvalidSignature { index })?;
            if !self.census.is_registered(&signer) {
                return Err(BridgeError::InvalidSignature { index });
            }
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
        let required = supermajority(self.census.registered_count());
        if signers.len() < required {
            return Err(BridgeError::InsufficientValidatorSignatures {
                got: signers.len(),
                required,
            });
        }

        channel.latest_state_hash = Some(final_state_hash);
        channel.sequence += 1;
        if let Some(d) = channel.dispute.as_mut() {
            d.status = DisputeStatus::Resolved;
        }
        drop(store);

        info!(
            channel = %short_hash(&channel_id),
            signer_count = signers.len(),
            "dispute resolved"
        );
        self.sink.emit(LedgerEvent::DisputeResolved {
            channel_id,
            final_state_hash,
            signer_count: signers.len(),
        });
        Ok(())
    }

    fn lock_funds(&self, channel_id: ChannelId, amount: Amount) -> BridgeResult<()> {
        let mut store = self.store.write();
        let channel = store.active_channel_mut(&channel_id)?;
        if amount > channel.unlocked_capacity() {
            return Err(BridgeError::ExceedsCapacity {
                requested: amount,
                locked: channel.locked,
                capacity: channel.capacity,
            });
        }
        channel.locked += amount;
        let total_locked = channel.locked;
        drop(store);

        debug!(channel = %short_hash(&channel_id), amount, total_locked, "funds locked");
        self.sink.emit(LedgerEvent::FundsLocked {
            channel_id,
            amount,
            total_locked,
        });
        Ok(())
    }

    fn release_funds(&self, channel_id: ChannelId, amount: Amount) -> BridgeResult<()> {
        let mut store = self.store.write();
        let channel = store.active_channel_mut(&channel_id)?;
        if amount > channel.locked {
            return Err(BridgeError::InsufficientLocked {
                requested: amount,
                locked: channel.locked,
            });
        }
        channel.locked -= amount;
        let total_locked = channel.locked;
        drop(store);

        debug!(channel = %short_hash(&channel_id), amount, total_locked, "funds released");
        self.sink.emit(LedgerEvent::FundsReleased {
            channel_id,
            amount,
            total_locked,
        });
        Ok(())
    }

    fn deactivate_channel(&self, channel_id: ChannelId) -> BridgeResult<()> {
        let mut store = self.store.write();
        let channel = store.active_channel_mut(&channel_id)?;
        channel.active = false;
        drop(store);

        info!(channel = %short_hash(&channel_id), "channel deactivated");
        self.sink
            .emit(LedgerEvent::BridgeChannelDeactivated { channel_id });
        Ok(())
    }

    fn channel(&self, channel_id: &ChannelId) -> Option<BridgeChannel> {
        self.store.read().channels.get(channel_id).cloned()
    }

    fn channels(&self) -> Vec<BridgeChannel> {
        let store = self.store.read();
        let mut all: Vec<BridgeChannel> = store.channels.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        all
    }

    fn channel_count(&self) -> usize {
        self.store.read().channels.len()
    }
}
