//! Trellis node runtime.
//!
//! Wires the six subsystem crates into one process: a shared event bus,
//! cross-subsystem port adapters, Prometheus-backed bus observers, and the
//! startup choreography that exercises the whole ledger once on boot.
//!
//! The `trellis-node` binary is a thin shell over this library; integration
//! tests build the same [`SubsystemContainer`] the binary runs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod demo;
pub mod wiring;

pub use container::{ConfigError, NodeConfig, SubsystemContainer};
