//! # TL-06: Channel Ledger
//!
//! Off-ledger payment channels: multi-party balance tracking, hash
//! time-locked commitments, cooperative close, and dispute escalation to
//! the channel bridge.
//!
//! ## Architecture
//!
//! - **Domain**: channel and HTLC entities, lifecycle state machines,
//!   participant and funding invariants.
//! - **Ports**: the inbound [`ChannelLedgerApi`] and the outbound
//!   [`BridgeGateway`] through which channels are anchored on the bridge.
//! - **Service**: [`ChannelLedgerService`], the single-writer ledger.
//!
//! ## Conservation
//!
//! For every channel, participant balances plus `total_locked` equal the
//! registered capacity at all times. Value moves between the two pools
//! when an HTLC is created, resolved, or refunded; it never enters or
//! leaves a channel after funding.
//!
//! ## HTLC lifecycle
//!
//! An HTLC debits its sender at creation and parks the amount in the
//! locked pool. The recipient collects by presenting the SHA-256 preimage
//! before the timelock lapses; after it lapses only the sender can claim
//! the refund. The ledger never sweeps expired commitments on its own, so
//! a channel cannot close while any HTLC still holds value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{Channel, Htlc};
pub use domain::errors::{ChannelError, ChannelResult};
pub use domain::value_objects::{ChannelPhase, ChannelSnapshot, HtlcState, Preimage, SnapshotError};
pub use ports::inbound::ChannelLedgerApi;
pub use ports::outbound::{BridgeGateway, GatewayRejection, MemoryBridgeGateway};
pub use service::ChannelLedgerService;

/// Crate version, sourced from the manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
