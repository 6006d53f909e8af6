//! Error types for the shard registry.

use shared_types::errors::ErrorKind;
use shared_types::ShardId;
use thiserror::Error;

/// Result alias for shard registry operations.
pub type ShardResult<T> = Result<T, ShardError>;

/// Errors raised by shard registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShardError {
    /// Fewer validators than the configured minimum.
    #[error("insufficient validators: got {got}, minimum {required}")]
    InsufficientValidators {
        /// Supplied validator count.
        got: usize,
        /// Required minimum.
        required: usize,
    },

    /// Shards cannot be created with zero capacity.
    #[error("shard capacity must be non-zero")]
    ZeroCapacity,

    /// The same validator appears twice in the initial set.
    #[error("duplicate validator in shard set")]
    DuplicateValidator,

    /// No shard with this id exists.
    #[error("unknown shard: {0}")]
    UnknownShard(ShardId),

    /// Load figure above the shard's capacity.
    #[error("capacity exceeded: load {load} over capacity {capacity}")]
    CapacityExceeded {
        /// Rejected load figure.
        load: u64,
        /// Shard capacity.
        capacity: u64,
    },

    /// The operation requires a different lifecycle status.
    #[error("invalid status: expected {expected}, shard is {actual}")]
    InvalidStatus {
        /// Status the operation requires.
        expected: String,
        /// Status the shard currently holds.
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

    /// The shard is not serving load in its current status.
    #[error("shard {shard_id} not serving: status {status}")]
    NotServing {
        /// Shard id.
        shard_id: ShardId,
        /// Current status.
        status: String,
    },

    /// Caller is not a member of the shard's validator set.
    #[error("caller is not a validator of shard {shard_id}")]
    NotShardValidator {
        /// Shard the operation referenced.
        shard_id: ShardId,
    },

    /// Caller lacks the capability the operation requires.
    #[error("not authorized for {action}")]
    NotAuthorized {
        /// Operation that was attempted.
        action: &'static str,
    },
}

impl ShardError {
    /// Coarse classification used by callers deciding whether to retry.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShardError::InsufficientValidators { .. }
            | ShardError::ZeroCapacity
            | ShardError::DuplicateValidator
            | ShardError::UnknownShard(_)
            | ShardError::CapacityExceeded { .. } => ErrorKind::Validation,
            ShardError::InvalidStatus { .. }
            | ShardError::InvalidTransition { .. }
            | ShardError::NotServing { .. } => ErrorKind::StateConflict,
            ShardError::NotShardValidator { .. } | ShardError::NotAuthorized { .. } => {
                ErrorKind::Authorization
            }
        }
    }
}
