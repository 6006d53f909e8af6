//! Core entities for the channel bridge.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, ChannelId, Hash};

use super::value_objects::DisputeStatus;

/// A dispute raised against a channel's latest agreed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Participant who raised it.
    pub disputant: Address,
    /// Opaque evidence supplied by the disputant.
    pub proof: Vec<u8>,
    /// When the dispute was opened (seconds).
    pub opened_at: u64,
    /// Unix time at which resolution becomes possible.
    pub window_ends_at: u64,
    /// Current status.
    pub status: DisputeStatus,
}

/// The bridge's record of an off-chain channel.
///
/// The bridge never sees balances; it anchors the countersigned state hash,
/// tracks locked funds against capacity, and arbitrates disputes. The
/// id is content-derived, so ledger and bridge agree on it without
/// coordination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeChannel {
    /// Content-derived id: Sha-256 over participants, capacity, and the
    /// opening timestamp.
    pub id: ChannelId,
    /// Ordered participant list. At least two, all distinct.
    pub participants: Vec<Address>,
    /// Channel capacity.
    pub capacity: Amount,
    /// Funds currently locked. Never exceeds `capacity`.
    pub locked: Amount,
    /// Latest agreed state hash, absent until the first update.
    pub latest_state_hash: Option<Hash>,
    /// Sequence of the latest accepted update.
    pub sequence: u64,
    /// Cleared when the ledger closes the channel.
    pub active: bool,
    /// Dispute bookkeeping, absent until the first dispute.
    pub dispute: Option<Dispute>,
    /// Registration timestamp (seconds).
    pub opened_at: u64,
}

impl BridgeChannel {
    /// Creates an active record with no anchored state and sequence zero.
    pub fn new(
        id: ChannelId,
        participants: Vec<Address>,
        capacity: Amount,
        opened_at: u64,
    ) -> Self {
        Self {
            id,
            participants,
            capacity,
            locked: 0,
            latest_state_hash: None,
            sequence: 0,
            active: true,
            dispute: None,
            opened_at,
        }
    }

    /// Whether `who` is one of the channel's participants.
    pub fn has_participant(&self, who: &Address) -> bool {
        self.participants.contains(who)
    }

    /// Whether a dispute is currently open.
    pub fn has_open_dispute(&self) -> bool {
        matches!(&self.dispute, Some(d) if d.status == DisputeStatus::Initiated)
    }

    /// Capacity not currently locked.
    pub fn unlocked_capacity(&self) -> Amount {
        self.capacity - self.locked
    }
}
