//! Channel ledger service: balances, HTLCs, and the close protocol.
//!
//! All validation runs before the first write of an operation, so a failed
//! call leaves no partial state. Bridge calls happen before the local
//! commit; a gateway refusal therefore aborts cleanly. Conservation holds
//! after every commit: balances plus the locked pool equal capacity.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use shared_bus::{EventSink, LedgerEvent};
use shared_types::config::ChannelParams;
use shared_types::{short_hash, Address, Amount, ChannelId, Hash, HtlcId, TimeSource};

use crate::domain::entities::{Channel, Htlc};
use crate::domain::errors::{ChannelError, ChannelResult};
use crate::domain::invariants::{
    derive_htlc_id, hash_lock_of, invariant_funding, invariant_participant_set,
};
use crate::domain::value_objects::{ChannelPhase, HtlcState, Preimage};
use crate::ports::inbound::ChannelLedgerApi;
use crate::ports::outbound::BridgeGateway;

#[derive(Debug, Default)]
struct LedgerStore {
    channels: HashMap<ChannelId, Channel>,
    htlcs: HashMap<HtlcId, Htlc>,
}

/// The channel ledger. Single-writer; every operation takes the store lock,
/// validates, commits, releases, then emits.
pub struct ChannelLedgerService {
    store: RwLock<LedgerStore>,
    params: ChannelParams,
    gateway: Arc<dyn BridgeGateway>,
    sink: Arc<dyn EventSink>,
    time: Arc<dyn TimeSource>,
}

impl ChannelLedgerService {
    /// Creates a ledger with the given parameter set and dependencies.
    pub fn new(
        params: ChannelParams,
        gateway: Arc<dyn BridgeGateway>,
        sink: Arc<dyn EventSink>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store: RwLock::new(LedgerStore::default()),
            params,
            gateway,
            sink,
            time,
        }
    }

    fn emit_phase_change(&self, channel_id: ChannelId, old: ChannelPhase, new: ChannelPhase) {
        self.sink.emit(LedgerEvent::ChannelPhaseChanged {
            channel_id,
            old_phase: format!("{old:?}"),
            new_phase: format!("{new:?}"),
        });
    }
}

impl ChannelLedgerApi for ChannelLedgerService {
    fn open(
        &self,
        participants: Vec<Address>,
        capacity: Amount,
        funding: Amount,
    ) -> ChannelResult<ChannelId> {
        invariant_participant_set(&participants)?;
        invariant_funding(capacity, funding)?;

        let opened_at = self.time.now();
        let id = self
            .gateway
            .register_channel(&participants, capacity, opened_at)
            .map_err(|e| ChannelError::BridgeRefused { reason: e.0 })?;

        let mut store = self.store.write();
        if store.channels.contains_key(&id) {
            return Err(ChannelError::ChannelExists(id));
        }
        store
            .channels
            .insert(id, Channel::new(id, participants.clone(), capacity, opened_at));
        drop(store);

        info!(
            channel = %short_hash(&id),
            participants = participants.len(),
            capacity,
            "channel opened"
        );
        self.sink.emit(LedgerEvent::ChannelOpened {
            channel_id: id,
            participants,
            capacity,
        });
        Ok(id)
    }

    fn confirm_open(&self, channel_id: ChannelId, caller: Address) -> ChannelResult<()> {
        let mut store = self.store.write();
        let channel = store
            .channels
            .get_mut(&channel_id)
            .ok_or(ChannelError::UnknownChannel(channel_id))?;
        if !channel.has_participant(&caller) {
            return Err(ChannelError::NotParticipant);
        }
        let old = channel.phase;
        channel.transition_to(ChannelPhase::Active)?;
        drop(store);

        info!(channel = %short_hash(&channel_id), "channel active");
        self.emit_phase_change(channel_id, old, ChannelPhase::Active);
        Ok(())
    }

    fn create_htlc(
        &self,
        channel_id: ChannelId,
        sender: Address,
        recipient: Address,
        amount: Amount,
        hash_lock: Hash,
        timelock: u64,
    ) -> ChannelResult<HtlcId> {
        let now = self.time.now();

        let mut store = self.store.write();
        let LedgerStore { channels, htlcs } = &mut *store;
        let channel = channels
            .get_mut(&channel_id)
            .ok_or(ChannelError::UnknownChannel(channel_id))?;
        if !channel.phase.accepts_htlcs() {
            return Err(ChannelError::ChannelNotActive {
                phase: format!("{:?}", channel.phase),
            });
        }
        if !channel.has_participant(&sender) || !channel.has_participant(&recipient) {
            return Err(ChannelError::NotParticipant);
        }
        if sender == recipient {
            return Err(ChannelError::SelfPayment);
        }
        if channel.htlc_count >= self.params.max_htlcs_per_channel {
            return Err(ChannelError::TooManyHtlcs {
                cap: self.params.max_htlcs_per_channel,
            });
        }
        if amount == 0 {
            return Err(ChannelError::ZeroAmount);
        }
        let available = channel.balance_of(&sender).unwrap_or(0);
        if available < amount {
            return Err(ChannelError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        if timelock <= now {
            return Err(ChannelError::TimelockInPast { timelock, now });
        }
        let id = derive_htlc_id(&channel_id, &sender, &recipient, amount, &hash_lock, timelock);
        if htlcs.contains_key(&id) {
            return Err(ChannelError::HtlcExists(id));
        }

        channel.debit(&sender, amount);
        channel.total_locked += amount;
        channel.htlc_count += 1;
        htlcs.insert(
            id,
            Htlc {
                id,
                channel_id,
                sender,
                recipient,
                amount,
                hash_lock,
                timelock,
                state: HtlcState::Pending,
                preimage: None,
                created_at: now,
            },
        );
        drop(store);

        debug!(
            htlc = %short_hash(&id),
            channel = %short_hash(&channel_id),
            amount,
            timelock,
            "htlc created"
        );
        self.sink.emit(LedgerEvent::HtlcCreated {
            htlc_id: id,
            channel_id,
            sender,
            recipient,
            amount,
            timelock,
        });
        Ok(id)
    }

    fn resolve_htlc(&self, htlc_id: HtlcId, preimage: Preimage) -> ChannelResult<()> {
        let now = self.time.now();

        let mut store = self.store.write();
        let LedgerStore { channels, htlcs } = &mut *store;
        let htlc = htlcs
            .get_mut(&htlc_id)
            .ok_or(ChannelError::UnknownHtlc(htlc_id))?;
        if htlc.state != HtlcState::Pending {
            return Err(ChannelError::HtlcNotPending {
                state: format!("{:?}", htlc.state),
            });
        }
        if hash_lock_of(&preimage) != htlc.hash_lock {
            return Err(ChannelError::InvalidPreimage);
        }
        if htlc.is_expired(now) {
            return Err(ChannelError::HtlcExpired {
                timelock: htlc.timelock,
            });
        }
        let channel = channels
            .get_mut(&htlc.channel_id)
            .ok_or(ChannelError::UnknownChannel(htlc.channel_id))?;

        channel.credit(&htlc.recipient, htlc.amount);
        channel.total_locked -= htlc.amount;
        channel.htlc_count -= 1;
        htlc.state = HtlcState::Completed;
        htlc.preimage = Some(preimage);
        let (channel_id, recipient, amount) = (htlc.channel_id, htlc.recipient, htlc.amount);
        drop(store);

        info!(
            htlc = %short_hash(&htlc_id),
            channel = %short_hash(&channel_id),
            amount,
            "htlc resolved"
        );
        self.sink.emit(LedgerEvent::HtlcResolved {
            htlc_id,
            channel_id,
            recipient,
            amount,
        });
        Ok(())
    }

    fn refund_htlc(&self, htlc_id: HtlcId, caller: Address) -> ChannelResult<()> {
        let now = self.time.now();

        let mut store = self.store.write();
        let LedgerStore { channels, htlcs } = &mut *store;
        let htlc = htlcs
            .get_mut(&htlc_id)
            .ok_or(ChannelError::UnknownHtlc(htlc_id))?;
        if htlc.state != HtlcState::Pending {
            return Err(ChannelError::HtlcNotPending {
                state: format!("{:?}", htlc.state),
            });
        }
        if caller != htlc.sender {
            return Err(ChannelError::NotSender);
        }
        if !htlc.is_expired(now) {
            return Err(ChannelError::TimelockNotReached {
                timelock: htlc.timelock,
            });
        }
        let channel = channels
            .get_mut(&htlc.channel_id)
            .ok_or(ChannelError::UnknownChannel(htlc.channel_id))?;

        channel.credit(&htlc.sender, htlc.amount);
        channel.total_locked -= htlc.amount;
        channel.htlc_count -= 1;
        htlc.state = HtlcState::Refunded;
        let (channel_id, sender, amount) = (htlc.channel_id, htlc.sender, htlc.amount);
        drop(store);

        info!(
            htlc = %short_hash(&htlc_id),
            channel = %short_hash(&channel_id),
            amount,
            "htlc refunded"
        );
        self.sink.emit(LedgerEvent::HtlcRefunded {
            htlc_id,
            channel_id,
            sender,
            amount,
        });
        Ok(())
    }

    fn initiate_close(
        &self,
        channel_id: ChannelId,
        caller: Address,
        state_hash: Hash,
    ) -> ChannelResult<()> {
        let settle_deadline = self.time.now() + self.params.settle_timeout_secs;

        let mut store = self.store.write();
        let channel = store
            .channels
            .get_mut(&channel_id)
            .ok_or(ChannelError::UnknownChannel(channel_id))?;
        if !channel.has_participant(&caller) {
            return Err(ChannelError::NotParticipant);
        }
        if channel.phase != ChannelPhase::Active {
            return Err(ChannelError::ChannelNotActive {
                phase: format!("{:?}", channel.phase),
            });
        }
        let old = channel.phase;
        channel.transition_to(ChannelPhase::Closing)?;
        channel.closing_state_hash = Some(state_hash);
        channel.settle_deadline = Some(settle_deadline);
        channel.confirmations = vec![caller];
        drop(store);

        info!(
            channel = %short_hash(&channel_id),
            settle_deadline,
            "cooperative close proposed"
        );
        self.sink.emit(LedgerEvent::CloseInitiated {
            channel_id,
            initiator: caller,
            state_hash,
            settle_deadline,
        });
        self.emit_phase_change(channel_id, old, ChannelPhase::Closing);
        Ok(())
    }

    fn confirm_close(&self, channel_id: ChannelId, caller: Address) -> ChannelResult<()> {
        let mut store = self.store.write();
        let channel = store
            .channels
            .get_mut(&channel_id)
            .ok_or(ChannelError::UnknownChannel(channel_id))?;
        if !channel.has_participant(&caller) {
            return Err(ChannelError::NotParticipant);
        }
        if channel.phase != ChannelPhase::Closing {
            return Err(ChannelError::ChannelNotClosing {
                phase: format!("{:?}", channel.phase),
            });
        }
        if channel.has_confirmed(&caller) {
            return Err(ChannelError::AlreadyConfirmed);
        }

        let completes = channel.confirmations.len() + 1 == channel.participants.len();
        if completes {
            // The final confirmation settles; value still parked in HTLCs
            // has no owner yet, so the close waits for it.
            if channel.htlc_count > 0 {
                return Err(ChannelError::OpenHtlcs {
                    count: channel.htlc_count,
                });
            }
            self.gateway
                .deactivate_channel(channel_id)
                .map_err(|e| ChannelError::BridgeRefused { reason: e.0 })?;
        }
        channel.confirmations.push(caller);
        let confirmations = channel.confirmations.len();
        let required = channel.participants.len();

        if !completes {
            drop(store);
            debug!(
                channel = %short_hash(&channel_id),
                confirmations,
                required,
                "close confirmed"
            );
            self.sink.emit(LedgerEvent::CloseConfirmed {
                channel_id,
                participant: caller,
                confirmations,
                required,
            });
            return Ok(());
        }

        let old = channel.phase;
        channel.transition_to(ChannelPhase::Closed)?;
        let final_balances = channel.balances.clone();
        drop(store);

        info!(channel = %short_hash(&channel_id), "channel closed");
        self.sink.emit(LedgerEvent::CloseConfirmed {
            channel_id,
            participant: caller,
            confirmations,
            required,
        });
        self.sink.emit(LedgerEvent::ChannelClosed {
            channel_id,
            final_balances,
        });
        self.emit_phase_change(channel_id, old, ChannelPhase::Closed);
        Ok(())
    }

    fn raise_dispute(
        &self,
        channel_id: ChannelId,
        caller: Address,
        proof: Vec<u8>,
    ) -> ChannelResult<()> {
        let mut store = self.store.write();
        let channel = store
            .channels
            .get_mut(&channel_id)
            .ok_or(ChannelError::UnknownChannel(channel_id))?;
        if !channel.has_participant(&caller) {
            return Err(ChannelError::NotParticipant);
        }
        let old = channel.phase;
        if !old.can_transition_to(&ChannelPhase::Disputed) {
            return Err(ChannelError::InvalidTransition {
                from: format!("{old:?}"),
                to: "Disputed".to_string(),
            });
        }
        self.gateway
            .submit_dispute(channel_id, caller, proof)
            .map_err(|e| ChannelError::BridgeRefused { reason: e.0 })?;
        channel.phase = ChannelPhase::Disputed;
        drop(store);

        warn!(channel = %short_hash(&channel_id), "dispute escalated to bridge");
        self.emit_phase_change(channel_id, old, ChannelPhase::Disputed);
        Ok(())
    }

    fn apply_resolution(
        &self,
        channel_id: ChannelId,
        final_state_hash: Hash,
    ) -> ChannelResult<()> {
        let settle_deadline = self.time.now() + self.params.settle_timeout_secs;

        let mut store = self.store.write();
        let channel = store
            .channels
            .get_mut(&channel_id)
            .ok_or(ChannelError::UnknownChannel(channel_id))?;
        if channel.phase != ChannelPhase::Disputed {
            return Err(ChannelError::ChannelNotDisputed {
                phase: format!("{:?}", channel.phase),
            });
        }
        let old = channel.phase;
        channel.transition_to(ChannelPhase::Closing)?;
        channel.closing_state_hash = Some(final_state_hash);
        channel.settle_deadline = Some(settle_deadline);
        channel.confirmations.clear();
        drop(store);

        info!(
            channel = %short_hash(&channel_id),
            settle_deadline,
            "arbitrated state applied"
        );
        self.sink.emit(LedgerEvent::ResolutionApplied {
            channel_id,
            final_state_hash,
        });
        self.emit_phase_change(channel_id, old, ChannelPhase::Closing);
        Ok(())
    }

    fn channel(&self, channel_id: &ChannelId) -> Option<Channel> {
        self.store.read().channels.get(channel_id).cloned()
    }

    fn channels(&self) -> Vec<Channel> {
        let store = self.store.read();
        let mut all: Vec<Channel> = store.channels.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        all
    }

    fn htlc(&self, htlc_id: &HtlcId) -> Option<Htlc> {
        self.store.read().htlcs.get(htlc_id).cloned()
    }

    fn channel_htlcs(&self, channel_id: &ChannelId) -> Vec<Htlc> {
        let store = self.store.read();
        let mut owned: Vec<Htlc> = store
            .htlcs
            .values()
            .filter(|h| h.channel_id == *channel_id)
            .cloned()
            .collect();
        owned.sort_by_key(|h| h.id);
        owned
    }

    fn channel_count(&self) -> usize {
        self.store.read().channels.len()
    }
}
