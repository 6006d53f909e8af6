//! Error types for the validator registry.

use shared_types::errors::ErrorKind;
use shared_types::{Address, Amount, BasisPoints, ShardId};
use thiserror::Error;

/// Result alias for registry operations.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Errors raised by validator registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidatorError {
    /// Commission rate exceeds the protocol cap.
    #[error("invalid commission: {got} bps exceeds cap of {cap} bps")]
    InvalidCommission {
        /// Requested commission in basis points.
        got: BasisPoints,
        /// Maximum permitted commission.
        cap: BasisPoints,
    },

    /// Stake below the registration minimum.
    #[error("insufficient stake: {got} below minimum {minimum}")]
    InsufficientStake {
        /// Offered stake.
        got: Amount,
        /// Required minimum stake.
        minimum: Amount,
    },

    /// An identity can only register once.
    #[error("validator already registered: {0:?}")]
    AlreadyRegistered(Address),

    /// No validator with this identity exists.
    #[error("unknown validator: {0:?}")]
    UnknownValidator(Address),

    /// The operation requires a different lifecycle status.
    #[error("invalid status: expected {expected}, validator is {actual}")]
    InvalidStatus {
        /// Status the operation requires.
        expected: String,
        /// Status the validator currently holds.
        actual: String,
    },

    /// Requested status change is not a legal transition.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// The shard already holds its maximum validator count.
    #[error("shard {shard_id} is full: capacity {cap}")]
    ShardFull {
        /// Target shard.
        shard_id: ShardId,
        /// Maximum validators per shard.
        cap: usize,
    },

    /// Validator is already assigned to this shard.
    #[error("validator already assigned to shard {shard_id}")]
    AlreadyAssigned {
        /// Shard holding the existing assignment.
        shard_id: ShardId,
    },

    /// Validator has no assignment for this shard.
    #[error("validator not assigned to shard {shard_id}")]
    NotAssigned {
        /// Shard the operation referenced.
        shard_id: ShardId,
    },

    /// Performance score outside the 0..=100 range.
    #[error("invalid performance score: {got}")]
    InvalidScore {
        /// Rejected score.
        got: u8,
    },

    /// Jail term has not elapsed yet.
    #[error("jail term not elapsed: now {now}, release at {until}")]
    JailNotElapsed {
        /// Current wall-clock seconds.
        now: u64,
        /// Release timestamp.
        until: u64,
    },

    /// Caller lacks the capability the operation requires.
    #[error("not authorized for {action}")]
    NotAuthorized {
        /// Operation that was attempted.
        action: &'static str,
    },

    /// The stake vault refused a custody operation.
    #[error("stake vault rejected operation: {0}")]
    VaultRejected(String),
}

impl ValidatorError {
    /// Coarse classification used by callers deciding whether to retry.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidatorError::InvalidCommission { .. }
            | ValidatorError::InsufficientStake { .. }
            | ValidatorError::AlreadyRegistered(_)
            | ValidatorError::UnknownValidator(_)
            | ValidatorError::NotAssigned { .. }
            | ValidatorError::InvalidScore { .. } => ErrorKind::Validation,
            ValidatorError::InvalidStatus { .. }
            | ValidatorError::InvalidTransition { .. }
            | ValidatorError::AlreadyAssigned { .. } => ErrorKind::StateConflict,
            ValidatorError::ShardFull { .. } | ValidatorError::VaultRejected(_) => {
                ErrorKind::ResourceExhaustion
            }
            ValidatorError::JailNotElapsed { .. } => ErrorKind::Staleness,
            ValidatorError::NotAuthorized { .. } => ErrorKind::Authorization,
        }
    }
}
