//! # TL-05: Channel Bridge
//!
//! The on-ledger anchor for off-chain payment channels: countersigned state
//! hashes with strictly advancing sequence numbers, collateral locked
//! against channel capacity, and a dispute path arbitrated by validator
//! supermajority.
//!
//! ## Architecture
//!
//! This crate follows the hexagonal (ports and adapters) pattern:
//! - `domain/` - Pure business logic: entities, value objects, invariants
//! - `ports/` - Interface definitions (inbound API, outbound dependencies)
//! - `adapters/` - k256 signer recovery for the outbound verifier port
//! - `service` - The bridge service implementing the inbound port
//!
//! ## Trust model
//!
//! The bridge never sees channel balances. Participants settle off-chain
//! and periodically anchor a hash of their agreed state; the bridge accepts
//! an anchor only when every participant signed it and the sequence moved
//! forward. A participant who believes the anchored state is wrong opens a
//! dispute, which freezes anchoring for a fixed window and then requires a
//! supermajority of registered validators to sign off on the final state.
//!
//! ## Identifiers
//!
//! Channel ids are content-derived from the participant set, the capacity,
//! and the opening timestamp. The ledger that opens a channel and the
//! bridge that anchors it compute the same id independently.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::recovering_verifier::RecoveringVerifier;
pub use domain::entities::{BridgeChannel, Dispute};
pub use domain::errors::{BridgeError, BridgeResult};
pub use domain::value_objects::{DisputeStatus, StateUpdate};
pub use ports::inbound::ChannelBridgeApi;
pub use ports::outbound::{SignatureVerifier, ValidatorCensus};
pub use service::ChannelBridgeService;

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
