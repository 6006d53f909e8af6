//! # Port Adapters
//!
//! Concrete implementations of the subsystems' outbound ports, backed by the
//! peer subsystems themselves. This is the only place where two subsystem
//! crates meet: each service sees nothing but its own port trait.
//!
//! ```text
//! tl-02 consensus ──ValidatorDirectory──▶ RegistryDirectory ──▶ tl-01
//! tl-02 consensus ──StateRootSink──────▶ ShardRootSink ──────▶ tl-03
//! tl-05 bridge ────ValidatorCensus─────▶ RegistryCensus ─────▶ tl-01
//! tl-06 channels ──BridgeGateway───────▶ BridgeChannelGateway ▶ tl-05
//! ```

pub mod bridge_gateway;
pub mod registry_directory;
pub mod shard_root_sink;

pub use bridge_gateway::BridgeChannelGateway;
pub use registry_directory::{RegistryCensus, RegistryDirectory};
pub use shard_root_sink::ShardRootSink;
