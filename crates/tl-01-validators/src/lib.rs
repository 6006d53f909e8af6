//! # TL-01: Validator Registry
//!
//! Membership and staking lifecycle for the validator set. Tracks each
//! validator from registration through activation, shard assignment,
//! performance scoring, and the punitive paths (jailing, slashing).
//!
//! ## Architecture
//!
//! This crate follows the hexagonal (ports and adapters) pattern:
//! - `domain/` - Pure business logic: entities, value objects, invariants
//! - `ports/` - Interface definitions (inbound API, outbound dependencies)
//! - `service` - The registry service implementing the inbound port
//!
//! ## Lifecycle
//!
//! ```text
//! Pending ──> Active ──> Jailed ──> Active (after jail term)
//!                │
//!                └─────> Slashed (terminal)
//! ```
//!
//! Stake custody lives behind the [`StakeVault`] outbound port; the
//! registry only records amounts and forwards custody operations.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{ShardAssignment, Validator};
pub use domain::errors::{ValidatorError, ValidatorResult};
pub use domain::value_objects::ValidatorStatus;
pub use ports::inbound::ValidatorRegistryApi;
pub use ports::outbound::{InMemoryStakeVault, StakeVault, VaultError};
pub use service::RegistryService;

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
