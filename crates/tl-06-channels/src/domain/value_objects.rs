//! Value objects for the channel ledger.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use shared_types::{Address, Amount, ChannelId, Hash};

/// A hash-lock preimage. Revealing one that hashes to the lock is what
/// entitles the recipient to an HTLC's amount.
pub type Preimage = [u8; 32];

/// Lifecycle phase of a payment channel.
///
/// Phases only advance; a Closed channel never reopens. Disputed is the
/// recoverable branch: bridge arbitration returns the channel to Closing
/// with an arbitrated state hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelPhase {
    /// Registered with the bridge, waiting for funding confirmation.
    Opening,
    /// Open for HTLC traffic.
    Active,
    /// Cooperative close proposed; collecting confirmations.
    Closing,
    /// All participants confirmed; balances distributed. Terminal.
    Closed,
    /// A participant escalated to the bridge; waiting for arbitration.
    Disputed,
}

impl ChannelPhase {
    /// Whether a transition from this phase to `target` is permitted.
    pub fn can_transition_to(&self, target: &ChannelPhase) -> bool {
        use ChannelPhase::*;
        matches!(
            (self, target),
            (Opening, Active)
                | (Active, Closing)
                | (Active, Disputed)
                | (Closing, Closed)
                | (Closing, Disputed)
                | (Disputed, Closing)
        )
    }

    /// Whether HTLCs may be created in this phase.
    pub fn accepts_htlcs(&self) -> bool {
        matches!(self, ChannelPhase::Active)
    }

    /// Whether the phase admits no further change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChannelPhase::Closed)
    }
}

/// Lifecycle state of an HTLC.
///
/// Only Pending HTLCs hold locked value. Expired is the reported form of a
/// Pending HTLC whose timelock lapsed; the ledger never sweeps it, the
/// sender must claim the refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HtlcState {
    /// Holding the amount, waiting for the preimage or the timelock.
    Pending,
    /// Resolved with the correct preimage; the recipient was credited.
    Completed,
    /// Refunded to the sender after the timelock.
    Refunded,
    /// Timelock lapsed without resolution; only the refund path remains.
    Expired,
}

impl HtlcState {
    /// Whether a transition from this state to `target` is permitted.
    pub fn can_transition_to(&self, target: &HtlcState) -> bool {
        use HtlcState::*;
        matches!(
            (self, target),
            (Pending, Completed) | (Pending, Refunded) | (Pending, Expired) | (Expired, Refunded)
        )
    }

    /// Whether the HTLC still holds its amount.
    pub fn holds_value(&self) -> bool {
        matches!(self, HtlcState::Pending | HtlcState::Expired)
    }

    /// Whether the state admits no further change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, HtlcState::Completed | HtlcState::Refunded)
    }
}

/// The channel state participants countersign off-ledger.
///
/// Only the digest ever reaches the bridge or the ledger. The encoding is
/// bincode over the fields in declaration order, so every party derives the
/// same hash for the same state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Channel the state belongs to.
    pub channel_id: ChannelId,
    /// Monotonic state sequence number.
    pub sequence: u64,
    /// Balance per participant at this sequence.
    pub balances: Vec<(Address, Amount)>,
}

/// Failure to encode a snapshot canonically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("snapshot encoding failed: {0}")]
pub struct SnapshotError(pub String);

impl ChannelSnapshot {
    /// Digest of the canonical encoding.
    pub fn digest(&self) -> Result<Hash, SnapshotError> {
        let bytes = bincode::serialize(self).map_err(|e| SnapshotError(e.to_string()))?;
        Ok(Sha256::digest(&bytes).into())
    }
}
