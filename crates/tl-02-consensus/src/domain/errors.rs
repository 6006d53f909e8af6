//! Error types for the consensus engine.

use shared_types::errors::ErrorKind;
use shared_types::{RoundId, ShardId};
use thiserror::Error;

/// Result alias for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Errors raised by consensus operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsensusError {
    /// The engine holds no configuration for this shard.
    #[error("consensus not configured for shard {0}")]
    ConsensusNotConfigured(ShardId),

    /// The shard is already configured.
    #[error("consensus already configured for shard {0}")]
    AlreadyConfigured(ShardId),

    /// The shard has no active validators to run a round with.
    #[error("no active validators for shard {shard_id}")]
    NoActiveValidators {
        /// Shard that was queried.
        shard_id: ShardId,
    },

    /// A round is already open on this shard.
    #[error("round {round_id} already in progress on shard {shard_id}")]
    RoundInProgress {
        /// Shard id.
        shard_id: ShardId,
        /// Open round.
        round_id: RoundId,
    },

    /// No open round matches the given id.
    #[error("unknown round {round_id} on shard {shard_id}")]
    UnknownRound {
        /// Shard id.
        shard_id: ShardId,
        /// Requested round.
        round_id: RoundId,
    },

    /// Only the selected proposer may submit a state root.
    #[error("caller is not the proposer; round belongs to {expected}")]
    NotProposer {
        /// Short rendering of the selected proposer.
        expected: String,
    },

    /// The round is in the wrong state for this operation.
    #[error("invalid round state: expected {expected}, round is {actual}")]
    InvalidRoundState {
        /// State the operation requires.
        expected: String,
        /// State the round currently holds.
        actual: String,
    },

    /// Requested state change is not a legal transition.
    #[error("invalid round transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: String,
        /// Requested state.
        to: String,
    },

    /// The round's end time has passed.
    #[error("round {round_id} expired at {end_time}, now {now}")]
    RoundExpired {
        /// Round id.
        round_id: RoundId,
        /// Deadline that passed.
        end_time: u64,
        /// Current time.
        now: u64,
    },

    /// The round's end time has not passed yet.
    #[error("deadline not reached: ends at {end_time}, now {now}")]
    DeadlineNotReached {
        /// Round deadline.
        end_time: u64,
        /// Current time.
        now: u64,
    },

    /// Each validator votes at most once per round.
    #[error("already voted in round {round_id}")]
    AlreadyVoted {
        /// Round id.
        round_id: RoundId,
    },

    /// Caller is not an active validator of the shard.
    #[error("caller is not an active validator of shard {shard_id}")]
    NotShardValidator {
        /// Shard id.
        shard_id: ShardId,
    },

    /// Caller lacks the capability the operation requires.
    #[error("not authorized for {action}")]
    NotAuthorized {
        /// Operation that was attempted.
        action: &'static str,
    },

    /// The downstream root sink refused the finalized root.
    #[error("state root sink rejected: {0}")]
    RootSinkRejected(String),
}

impl ConsensusError {
    /// Coarse classification used by callers deciding whether to retry.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsensusError::ConsensusNotConfigured(_)
            | ConsensusError::NoActiveValidators { .. }
            | ConsensusError::UnknownRound { .. } => ErrorKind::Validation,
            ConsensusError::AlreadyConfigured(_)
            | ConsensusError::RoundInProgress { .. }
            | ConsensusError::InvalidRoundState { .. }
            | ConsensusError::InvalidTransition { .. }
            | ConsensusError::AlreadyVoted { .. } => ErrorKind::StateConflict,
            ConsensusError::NotProposer { .. }
            | ConsensusError::NotShardValidator { .. }
            | ConsensusError::NotAuthorized { .. } => ErrorKind::Authorization,
            ConsensusError::RoundExpired { .. } => ErrorKind::Expiry,
            ConsensusError::DeadlineNotReached { .. } => ErrorKind::Staleness,
            ConsensusError::RootSinkRejected(_) => ErrorKind::ResourceExhaustion,
        }
    }
}
