//! Adapters binding the bridge's outbound ports to real infrastructure.

pub mod recovering_verifier;
