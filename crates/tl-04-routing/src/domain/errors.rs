//! Error types for the routing fabric.

use shared_types::errors::ErrorKind;
use shared_types::{short_hash, MessageId, ShardId};
use thiserror::Error;
use uuid::Uuid;

/// Result alias for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Errors raised by routing operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// A shard cannot route to itself.
    #[error("route source and target are the same shard: {0}")]
    SelfRoute(ShardId),

    /// A live route for the ordered pair already exists.
    #[error("route {source} -> {target} already exists")]
    RouteExists {
        /// Source shard.
        r#source: ShardId,
        /// Target shard.
        target: ShardId,
    },

    /// No route record for the ordered pair.
    #[error("no route {source} -> {target}")]
    RouteNotFound {
        /// Source shard.
        r#source: ShardId,
        /// Target shard.
        target: ShardId,
    },

    /// The route exists but is not accepting traffic.
    #[error("route {source} -> {target} not serving: status {status}")]
    RouteInactive {
        /// Source shard.
        r#source: ShardId,
        /// Target shard.
        target: ShardId,
        /// Current status.
        status: String,
    },

    /// The route is congested; sends are rejected until cleared.
    #[error("route {source} -> {target} is congested")]
    RouteCongested {
        /// Source shard.
        r#source: ShardId,
        /// Target shard.
        target: ShardId,
    },

    /// Messages must carry at least one payload byte.
    #[error("message payload is empty")]
    EmptyPayload,

    /// Payload above the configured maximum.
    #[error("payload too large: {got} bytes over maximum {max}")]
    PayloadTooLarge {
        /// Supplied payload size.
        got: usize,
        /// Configured maximum.
        max: usize,
    },

    /// More messages than a batch may carry.
    #[error("batch too large: {got} messages over maximum {max}")]
    BatchTooLarge {
        /// Supplied message count.
        got: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Batches must carry at least one message.
    #[error("batch is empty")]
    EmptyBatch,

    /// No message with this id exists on the referenced route.
    #[error("unknown message {} on this route", short_hash(.0))]
    UnknownMessage(MessageId),

    /// The message is past the status the operation requires.
    #[error("message {} is {status}, not Pending", short_hash(.message_id))]
    MessageNotPending {
        /// Message id.
        message_id: MessageId,
        /// Current status.
        status: String,
    },

    /// The message is already claimed by a live batch.
    #[error("message {} already belongs to batch {batch_id}", short_hash(.message_id))]
    MessageAlreadyBatched {
        /// Message id.
        message_id: MessageId,
        /// Claiming batch.
        batch_id: Uuid,
    },

    /// Acknowledgement requires a Delivered message.
    #[error("message {} is {status}, not Delivered", short_hash(.message_id))]
    MessageNotDelivered {
        /// Message id.
        message_id: MessageId,
        /// Current status.
        status: String,
    },

    /// Only the message's recipient may acknowledge it.
    #[error("caller is not the message recipient")]
    NotRecipient,

    /// No batch with this id exists.
    #[error("unknown batch: {0}")]
    UnknownBatch(Uuid),

    /// Processing requires a Pending batch.
    #[error("batch {batch_id} is {status}, not Pending")]
    BatchNotPending {
        /// Batch id.
        batch_id: Uuid,
        /// Current status.
        status: String,
    },

    /// Clearing a congested route while load is still at the threshold.
    #[error("route still congested: load {load} of {capacity}")]
    StillCongested {
        /// Current load.
        load: u64,
        /// Route capacity.
        capacity: u64,
    },

    /// Requested status change is not a legal transition.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Caller lacks the capability the operation requires.
    #[error("not authorized for {action}")]
    NotAuthorized {
        /// Operation that was attempted.
        action: &'static str,
    },
}

impl RoutingError {
    /// Coarse classification used by callers deciding whether to retry.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::SelfRoute(_)
            | RoutingError::RouteNotFound { .. }
            | RoutingError::EmptyPayload
            | RoutingError::PayloadTooLarge { .. }
            | RoutingError::BatchTooLarge { .. }
            | RoutingError::EmptyBatch
            | RoutingError::UnknownMessage(_)
            | RoutingError::UnknownBatch(_) => ErrorKind::Validation,
            RoutingError::RouteExists { .. }
            | RoutingError::RouteInactive { .. }
            | RoutingError::MessageNotPending { .. }
            | RoutingError::MessageAlreadyBatched { .. }
            | RoutingError::MessageNotDelivered { .. }
            | RoutingError::BatchNotPending { .. }
            | RoutingError::StillCongested { .. }
            | RoutingError::InvalidTransition { .. } => ErrorKind::StateConflict,
            RoutingError::RouteCongested { .. } => ErrorKind::ResourceExhaustion,
            RoutingError::NotRecipient | RoutingError::NotAuthorized { .. } => {
                ErrorKind::Authorization
            }
        }
    }
}
