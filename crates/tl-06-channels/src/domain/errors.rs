//! Error types for the channel ledger.

use shared_types::errors::ErrorKind;
use shared_types::{short_hash, Amount, ChannelId, HtlcId};
use thiserror::Error;

/// Result alias for ledger operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors raised by channel ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
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

    /// Channels cannot open with zero capacity.
    #[error("channel capacity must be non-zero")]
    ZeroCapacity,

    /// The supplied funding does not equal the capacity.
    #[error("funding {funding} does not match capacity {capacity}")]
    FundingMismatch {
        /// Funding supplied at open.
        funding: Amount,
        /// Requested capacity.
        capacity: Amount,
    },

    /// A channel with this id already exists in the ledger.
    #[error("channel {} already exists", short_hash(.0))]
    ChannelExists(ChannelId),

    /// No channel with this id exists.
    #[error("unknown channel {}", short_hash(.0))]
    UnknownChannel(ChannelId),

    /// The operation requires an Active channel.
    #[error("channel is {phase}, not Active")]
    ChannelNotActive {
        /// Current phase.
        phase: String,
    },

    /// The operation requires a Closing channel.
    #[error("channel is {phase}, not Closing")]
    ChannelNotClosing {
        /// Current phase.
        phase: String,
    },

    /// The operation requires a Disputed channel.
    #[error("channel is {phase}, not Disputed")]
    ChannelNotDisputed {
        /// Current phase.
        phase: String,
    },

    /// Requested phase change is not a legal transition.
    #[error("invalid phase transition from {from} to {to}")]
    InvalidTransition {
        /// Current phase.
        from: String,
        /// Requested phase.
        to: String,
    },

    /// Caller is not one of the channel's participants.
    #[error("caller is not a channel participant")]
    NotParticipant,

    /// HTLC sender and recipient must differ.
    #[error("htlc sender and recipient are the same participant")]
    SelfPayment,

    /// The channel is at its pending-HTLC cap.
    #[error("channel already holds {cap} pending htlcs")]
    TooManyHtlcs {
        /// Per-channel cap.
        cap: usize,
    },

    /// HTLC amounts must be positive.
    #[error("htlc amount must be non-zero")]
    ZeroAmount,

    /// The sender's balance does not cover the amount.
    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Requested amount.
        requested: Amount,
        /// Sender's current balance.
        available: Amount,
    },

    /// The timelock must lie in the future at creation.
    #[error("timelock {timelock} is not after now {now}")]
    TimelockInPast {
        /// Supplied timelock.
        timelock: u64,
        /// Clock reading at creation.
        now: u64,
    },

    /// An HTLC with these exact parameters already exists.
    #[error("htlc {} already exists", short_hash(.0))]
    HtlcExists(HtlcId),

    /// No HTLC with this id exists.
    #[error("unknown htlc {}", short_hash(.0))]
    UnknownHtlc(HtlcId),

    /// The HTLC is past the state the operation requires.
    #[error("htlc is {state}, not Pending")]
    HtlcNotPending {
        /// Current state.
        state: String,
    },

    /// The preimage does not hash to the lock.
    #[error("preimage does not match the hash lock")]
    InvalidPreimage,

    /// The timelock lapsed; only the refund path remains.
    #[error("htlc expired at {timelock}")]
    HtlcExpired {
        /// The lapsed timelock.
        timelock: u64,
    },

    /// Refunds open only once the timelock lapses.
    #[error("timelock {timelock} not reached")]
    TimelockNotReached {
        /// The pending timelock.
        timelock: u64,
    },

    /// Only the HTLC's sender may claim the refund.
    #[error("caller is not the htlc sender")]
    NotSender,

    /// The participant already confirmed this close.
    #[error("close already confirmed by this participant")]
    AlreadyConfirmed,

    /// Pending HTLCs must settle before the close completes.
    #[error("{count} htlcs still pending; resolve or refund them first")]
    OpenHtlcs {
        /// Pending HTLC count.
        count: usize,
    },

    /// The bridge refused the escalation.
    #[error("bridge refused: {reason}")]
    BridgeRefused {
        /// The bridge's stated reason.
        reason: String,
    },
}

impl ChannelError {
    /// Coarse classification used by callers deciding whether to retry.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChannelError::TooFewParticipants { .. }
            | ChannelError::DuplicateParticipant
            | ChannelError::ZeroCapacity
            | ChannelError::FundingMismatch { .. }
            | ChannelError::UnknownChannel(_)
            | ChannelError::SelfPayment
            | ChannelError::ZeroAmount
            | ChannelError::InsufficientBalance { .. }
            | ChannelError::TimelockInPast { .. }
            | ChannelError::UnknownHtlc(_)
            | ChannelError::InvalidPreimage => ErrorKind::Validation,
            ChannelError::ChannelExists(_)
            | ChannelError::ChannelNotActive { .. }
            | ChannelError::ChannelNotClosing { .. }
            | ChannelError::ChannelNotDisputed { .. }
            | ChannelError::InvalidTransition { .. }
            | ChannelError::HtlcExists(_)
            | ChannelError::HtlcNotPending { .. }
            | ChannelError::AlreadyConfirmed
            | ChannelError::OpenHtlcs { .. }
            | ChannelError::BridgeRefused { .. } => ErrorKind::StateConflict,
            ChannelError::TimelockNotReached { .. } => ErrorKind::Staleness,
            ChannelError::HtlcExpired { .. } => ErrorKind::Expiry,
            ChannelError::TooManyHtlcs { .. } => ErrorKind::ResourceExhaustion,
            ChannelError::NotParticipant | ChannelError::NotSender => ErrorKind::Authorization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_cover_the_taxonomy() {
        assert_eq!(ChannelError::InvalidPreimage.kind(), ErrorKind::Validation);
        assert_eq!(ChannelError::NotSender.kind(), ErrorKind::Authorization);
        assert_eq!(
            ChannelError::OpenHtlcs { count: 2 }.kind(),
            ErrorKind::StateConflict
        );
        assert_eq!(
            ChannelError::TimelockNotReached { timelock: 500 }.kind(),
            ErrorKind::Staleness
        );
        assert_eq!(
            ChannelError::HtlcExpired { timelock: 500 }.kind(),
            ErrorKind::Expiry
        );
        assert_eq!(
            ChannelError::TooManyHtlcs { cap: 32 }.kind(),
            ErrorKind::ResourceExhaustion
        );
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ChannelError::FundingMismatch { funding: 90, capacity: 100 }.to_string(),
            "funding 90 does not match capacity 100"
        );
        assert!(ChannelError::UnknownHtlc([0xab; 32])
            .to_string()
            .contains("abababab"));
    }
}
