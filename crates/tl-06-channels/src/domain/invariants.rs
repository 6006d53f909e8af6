//! Ledger invariants and content-derived identifiers.

use sha2::{Digest, Sha256};
use shared_types::{Address, Amount, ChannelId, Hash, HtlcId};

use super::errors::{ChannelError, ChannelResult};
use super::value_objects::Preimage;

/// Channels need at least this many participants.
pub const MIN_PARTICIPANTS: usize = 2;

/// The participant set must meet the minimum and hold no duplicates.
pub fn invariant_participant_set(participants: &[Address]) -> ChannelResult<()> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(ChannelError::TooFewParticipants {
            got: participants.len(),
            required: MIN_PARTICIPANTS,
        });
    }
    for (i, p) in participants.iter().enumerate() {
        if participants[..i].contains(p) {
            return Err(ChannelError::DuplicateParticipant);
        }
    }
    Ok(())
}

/// Capacity must be positive and fully funded at open.
pub fn invariant_funding(capacity: Amount, funding: Amount) -> ChannelResult<()> {
    if capacity == 0 {
        return Err(ChannelError::ZeroCapacity);
    }
    if funding != capacity {
        return Err(ChannelError::FundingMismatch { funding, capacity });
    }
    Ok(())
}

/// Content-derived HTLC id: Sha-256 over the owning channel, the parties,
/// the amount, the hash lock, and the timelock. Identical parameters name
/// the same HTLC.
pub fn derive_htlc_id(
    channel_id: &ChannelId,
    sender: &Address,
    recipient: &Address,
    amount: Amount,
    hash_lock: &Hash,
    timelock: u64,
) -> HtlcId {
    let mut hasher = Sha256::new();
    hasher.update(channel_id);
    hasher.update(sender);
    hasher.update(recipient);
    hasher.update(amount.to_be_bytes());
    hasher.update(hash_lock);
    hasher.update(timelock.to_be_bytes());
    hasher.finalize().into()
}

/// The hash lock a preimage unlocks.
pub fn hash_lock_of(preimage: &Preimage) -> Hash {
    Sha256::digest(preimage).into()
}
