//! # TL-02: Consensus Engine
//!
//! One round state machine per shard: a selected proposer submits a state
//! root, the shard's validators vote, and the round finalizes the moment
//! the vote threshold is met, pushing the root into the shard registry.
//!
//! ## Architecture
//!
//! This crate follows the hexagonal (ports and adapters) pattern:
//! - `domain/` - Pure business logic: entities, value objects, invariants
//! - `ports/` - Interface definitions (inbound API, outbound dependencies)
//! - `service` - The engine implementing the inbound port
//!
//! ## Round lifecycle
//!
//! ```text
//! Pending ──> Active ──> Voting ──> Finalizing ──> Completed
//!                │          │
//!                └──────────┴────> Failed (deadline sweep)
//! ```
//!
//! The electorate is snapshotted when the round starts: proposer selection,
//! vote eligibility, and the threshold all derive from that one sorted set,
//! so a round's outcome never shifts under membership churn.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{ConsensusRound, VoteReceipt};
pub use domain::errors::{ConsensusError, ConsensusResult};
pub use domain::value_objects::RoundState;
pub use ports::inbound::ConsensusApi;
pub use ports::outbound::{
    MemoryRootSink, SinkRejection, StateRootSink, StaticValidatorDirectory, ValidatorDirectory,
};
pub use service::ConsensusEngine;

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
