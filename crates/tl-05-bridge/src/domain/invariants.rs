//! Bridge invariants and canonical digests.

use sha2::{Digest, Sha256};
use shared_types::{Address, Amount, ChannelId, Hash};

use super::errors::{BridgeError, BridgeResult};

/// Channels need at least this many participants.
pub const MIN_PARTICIPANTS: usize = 2;

/// The participant set must meet the minimum and hold no duplicates.
pub fn invariant_participant_set(participants: &[Address]) -> BridgeResult<()> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(BridgeError::TooFewParticipants {
            got: participants.len(),
            required: MIN_PARTICIPANTS,
        });
    }
    for (i, p) in participants.iter().enumerate() {
        if participants[..i].contains(p) {
            return Err(BridgeError::DuplicateParticipant);
        }
    }
    Ok(())
}

/// Capacity must be positive.
pub fn invariant_nonzero_capacity(capacity: Amount) -> BridgeResult<()> {
    if capacity == 0 {
        return Err(BridgeError::ZeroCapacity);
    }
    Ok(())
}

/// Content-derived channel id: Sha-256 over the ordered participants, the
/// capacity, and the opening timestamp. Ledger and bridge derive the same id
/// from the same inputs.
pub fn derive_channel_id(participants: &[Address], capacity: Amount, opened_at: u64) -> ChannelId {
    let mut hasher = Sha256::new();
    for p in participants {
        hasher.update(p);
    }
    hasher.update(capacity.to_be_bytes());
    hasher.update(opened_at.to_be_bytes());
    hasher.finalize().into()
}

/// Canonical digest each participant signs for a state update:
/// Sha-256 over channel id, state hash, and sequence.
pub fn update_digest(channel_id: &ChannelId, state_hash: &Hash, sequence: u64) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(channel_id);
    hasher.update(state_hash);
    hasher.update(sequence.to_be_bytes());
    hasher.finalize().into()
}

/// Canonical digest validators sign to resolve a dispute: Sha-256 over
/// channel id and the arbitrated final state hash. Shorter input than the
/// update digest, so the two can never collide.
pub fn resolution_digest(channel_id: &ChannelId, final_state_hash: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(channel_id);
    hasher.update(final_state_hash);
    hasher.finalize().into()
}

/// Byzantine-fault-tolerant supermajority over `census_size` validators.
pub fn supermajority(census_size: usize) -> usize {
    census_size * 2 / 3 + 1
}
