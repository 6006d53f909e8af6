//! Cross-subsystem integration tests.
//!
//! Every test in this tree builds a full [`node_runtime::SubsystemContainer`]
//! on a manual clock, so the paths exercised are exactly the paths the node
//! runs: the channel ledger reaches the bridge through the live gateway, the
//! consensus engine reads the live registry and writes roots into the live
//! shard registry.

pub mod channel_scenarios;
pub mod consensus_flows;
pub mod dispute_flows;
pub mod e2e_choreography;
pub mod routing_scenarios;
pub mod shard_scenarios;
