//! Core entities for the channel ledger.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, ChannelId, Hash, HtlcId};

use super::errors::{ChannelError, ChannelResult};
use super::value_objects::{ChannelPhase, HtlcState, Preimage};

/// A payment channel and its participant balances.
///
/// Conservation invariant: the balances plus the HTLC-locked total always
/// sum to the capacity. Every operation moves value between those two pools
/// or between participants; nothing mints and nothing burns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Bridge-derived channel id.
    pub id: ChannelId,
    /// Ordered participant list. At least two, all distinct.
    pub participants: Vec<Address>,
    /// Capacity, equal to the funding supplied at open.
    pub capacity: Amount,
    /// Per-participant balances, in participant order.
    pub balances: Vec<(Address, Amount)>,
    /// Lifecycle phase.
    pub phase: ChannelPhase,
    /// Value currently held by pending HTLCs.
    pub total_locked: Amount,
    /// Number of pending HTLCs.
    pub htlc_count: usize,
    /// Proposed closing state hash, set by `initiate_close` or arbitration.
    pub closing_state_hash: Option<Hash>,
    /// Unix deadline for close confirmations.
    pub settle_deadline: Option<u64>,
    /// Participants who confirmed the close, in confirmation order.
    pub confirmations: Vec<Address>,
    /// Opening timestamp (seconds).
    pub opened_at: u64,
}

impl Channel {
    /// Creates an Opening channel with the funding split evenly. The
    /// division remainder goes to the first participant, so conservation
    /// holds for any capacity.
    pub fn new(
        id: ChannelId,
        participants: Vec<Address>,
        capacity: Amount,
        opened_at: u64,
    ) -> Self {
        let count = participants.len() as Amount;
        let share = capacity / count;
        let remainder = capacity % count;
        let balances = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, if i == 0 { share + remainder } else { share }))
            .collect();
        Self {
            id,
            participants,
            capacity,
            balances,
            phase: ChannelPhase::Opening,
            total_locked: 0,
            htlc_count: 0,
            closing_state_hash: None,
            settle_deadline: None,
            confirmations: Vec::new(),
            opened_at,
        }
    }

    /// Whether `who` is one of the channel's participants.
    pub fn has_participant(&self, who: &Address) -> bool {
        self.participants.contains(who)
    }

    /// The participant's balance, if they belong to the channel.
    pub fn balance_of(&self, who: &Address) -> Option<Amount> {
        self.balances
            .iter()
            .find(|(a, _)| a == who)
            .map(|(_, b)| *b)
    }

    /// Adds to a participant's balance. No-op for outsiders; callers check
    /// membership first.
    pub fn credit(&mut self, who: &Address, amount: Amount) {
        if let Some(entry) = self.balances.iter_mut().find(|(a, _)| a == who) {
            entry.1 += amount;
        }
    }

    /// Subtracts from a participant's balance. Callers check membership and
    /// sufficiency first.
    pub fn debit(&mut self, who: &Address, amount: Amount) {
        if let Some(entry) = self.balances.iter_mut().find(|(a, _)| a == who) {
            entry.1 = entry.1.saturating_sub(amount);
        }
    }

    /// Whether `who` already confirmed the close.
    pub fn has_confirmed(&self, who: &Address) -> bool {
        self.confirmations.contains(who)
    }

    /// Moves the channel to `target`, rejecting illegal transitions.
    pub fn transition_to(&mut self, target: ChannelPhase) -> ChannelResult<()> {
        if !self.phase.can_transition_to(&target) {
            return Err(ChannelError::InvalidTransition {
                from: format!("{:?}", self.phase),
                to: format!("{target:?}"),
            });
        }
        self.phase = target;
        Ok(())
    }

    /// Conservation check: balances plus locked value equal capacity.
    pub fn conserved(&self) -> bool {
        let balance_sum: Amount = self.balances.iter().map(|(_, b)| *b).sum();
        balance_sum + self.total_locked == self.capacity
    }
}

/// A hash-and-time-locked conditional transfer within a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Htlc {
    /// Content-derived id.
    pub id: HtlcId,
    /// Owning channel.
    pub channel_id: ChannelId,
    /// Paying participant, debited at creation.
    pub sender: Address,
    /// Receiving participant, credited on resolution.
    pub recipient: Address,
    /// Locked amount.
    pub amount: Amount,
    /// Sha-256 of the preimage that unlocks the amount.
    pub hash_lock: Hash,
    /// Unix time at which the refund path opens and resolution closes.
    pub timelock: u64,
    /// Committed lifecycle state.
    pub state: HtlcState,
    /// The revealed preimage, kept after completion.
    pub preimage: Option<Preimage>,
    /// Creation timestamp (seconds).
    pub created_at: u64,
}

impl Htlc {
    /// Whether the timelock has lapsed at `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.timelock
    }

    /// The state as observers see it at `now`: a Pending HTLC past its
    /// timelock reports Expired even though nothing swept it.
    pub fn status_at(&self, now: u64) -> HtlcState {
        if self.state == HtlcState::Pending && self.is_expired(now) {
            HtlcState::Expired
        } else {
            self.state
        }
    }
}
