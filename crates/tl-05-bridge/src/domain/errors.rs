//! Error types for the channel bridge.

use shared_types::errors::ErrorKind;
use shared_types::{short_hash, Amount, ChannelId};
use thiserror::Error;

/// Result alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised by bridge operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// Channels need at least two participants.
    #[error("too few participants: got {got}, minimum {required}")]
    TooFewParticipants {
        /// Supplied participant count.
        got: usize,
        /// Required minimum.
        required: usize,
    },

    /// The same participant appears twice.
    #[error("duplicate participant in channel set")]
    DuplicateParticipant,

    /// Channels cannot be registered with zero capacity.
    #[error("channel capacity must be non-zero")]
    ZeroCapacity,

    /// A channel with this content-derived id is already registered.
    #[error("channel {} already registered", short_hash(.0))]
    ChannelExists(ChannelId),

    /// No channel with this id exists.
    #[error("unknown channel {}", short_hash(.0))]
    UnknownChannel(ChannelId),

    /// The ledger has closed this channel; its record no longer mutates.
    #[error("channel {} is inactive", short_hash(.0))]
    ChannelInactive(ChannelId),

    /// Updates need exactly one signature per participant.
    #[error("signature count mismatch: got {got}, required {required}")]
    SignatureCountMismatch {
        /// Supplied signature count.
        got: usize,
        /// Participant count.
        required: usize,
    },

    /// A signature failed verification, or its signer is not eligible.
    #[error("invalid signature at index {index}")]
    InvalidSignature {
        /// Position in the submitted signature list.
        index: usize,
    },

    /// The update's sequence does not advance the stored one.
    #[error("stale sequence: proposed {proposed}, current {current}")]
    StaleSequence {
        /// Sequence carried by the rejected update.
        proposed: u64,
        /// Sequence currently anchored.
        current: u64,
    },

    /// Caller is not one of the channel's participants.
    #[error("caller is not a channel participant")]
    NotParticipant,

    /// A dispute is already open on this channel.
    #[error("dispute already open until {window_ends_at}")]
    DisputeAlreadyOpen {
        /// When the open dispute's window ends.
        window_ends_at: u64,
    },

    /// Resolution requires an open dispute.
    #[error("no dispute open on this channel")]
    DisputeNotOpen,

    /// The dispute window has not elapsed yet.
    #[error("dispute window open until {ends_at}")]
    DisputeWindowOpen {
        /// Unix time at which resolution becomes possible.
        ends_at: u64,
    },

    /// Fewer distinct validator signatures than the supermajority requires.
    #[error("insufficient validator signatures: got {got}, required {required}")]
    InsufficientValidatorSignatures {
        /// Distinct registered signers recovered.
        got: usize,
        /// Supermajority requirement.
        required: usize,
    },

    /// Locking this amount would push the counter past capacity.
    #[error("lock of {requested} exceeds capacity: {locked} of {capacity} already locked")]
    ExceedsCapacity {
        /// Requested lock amount.
        requested: Amount,
        /// Currently locked total.
        locked: Amount,
        /// Channel capacity.
        capacity: Amount,
    },

    /// Releasing more than is currently locked.
    #[error("release of {requested} exceeds locked total {locked}")]
    InsufficientLocked {
        /// Requested release amount.
        requested: Amount,
        /// Currently locked total.
        locked: Amount,
    },
}

impl BridgeError {
    /// Coarse classification used by callers deciding whether to retry.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::TooFewParticipants { .. }
            | BridgeError::DuplicateParticipant
            | BridgeError::ZeroCapacity
            | BridgeError::UnknownChannel(_)
            | BridgeError::SignatureCountMismatch { .. }
            | BridgeError::InvalidSignature { .. }
            | BridgeError::InsufficientValidatorSignatures { .. }
            | BridgeError::InsufficientLocked { .. } => ErrorKind::Validation,
            BridgeError::ChannelExists(_)
            | BridgeError::ChannelInactive(_)
            | BridgeError::DisputeAlreadyOpen { .. }
            | BridgeError::DisputeNotOpen => ErrorKind::StateConflict,
            BridgeError::StaleSequence { .. } | BridgeError::DisputeWindowOpen { .. } => {
                ErrorKind::Staleness
            }
            BridgeError::NotParticipant => ErrorKind::Authorization,
            BridgeError::ExceedsCapacity { .. } => ErrorKind::ResourceExhaustion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            BridgeError::InvalidSignature { index: 1 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BridgeError::StaleSequence { proposed: 3, current: 3 }.kind(),
            ErrorKind::Staleness
        );
        assert_eq!(
            BridgeError::DisputeWindowOpen { ends_at: 600 }.kind(),
            ErrorKind::Staleness
        );
        assert_eq!(BridgeError::NotParticipant.kind(), ErrorKind::Authorization);
        assert_eq!(
            BridgeError::ExceedsCapacity { requested: 10, locked: 95, capacity: 100 }.kind(),
            ErrorKind::ResourceExhaustion
        );
    }

    #[test]
    fn test_display_messages() {
        let err = BridgeError::SignatureCountMismatch { got: 1, required: 2 };
        assert_eq!(err.to_string(), "signature count mismatch: got 1, required 2");
        assert!(BridgeError::UnknownChannel([0xcd; 32])
            .to_string()
            .contains("cdcdcdcd"));
    }
}
