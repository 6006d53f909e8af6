//! # TL-03: Shard Registry
//!
//! Bookkeeping for the ledger's shards: capacity, live load, lifecycle
//! status, the finalized state-root mirror, and the rebalancing trigger
//! that fires when a shard runs hot.
//!
//! ## Architecture
//!
//! This crate follows the hexagonal (ports and adapters) pattern:
//! - `domain/` - Pure business logic: entities, value objects, invariants
//! - `ports/` - Interface definitions (inbound API)
//! - `service` - The registry service implementing the inbound port
//!
//! ## Rebalancing
//!
//! A load update that puts a shard at or above the rebalance threshold
//! starts a target search: the least-loaded Active shard with spare
//! capacity, lowest id on ties. With a target the shard enters
//! `Rebalancing` until [`complete_rebalance`] sheds load; without one it
//! stays Active and retries after the cooldown.
//!
//! [`complete_rebalance`]: ports::inbound::ShardRegistryApi::complete_rebalance

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::Shard;
pub use domain::errors::{ShardError, ShardResult};
pub use domain::value_objects::ShardStatus;
pub use ports::inbound::ShardRegistryApi;
pub use service::ShardRegistryService;

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
