//! # Subsystem Container
//!
//! Configuration loading and dependency injection for one node: the
//! container builds every subsystem in dependency order and hands out
//! `Arc` handles to the runtime, the demo, and the test suites.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig};
pub use subsystems::SubsystemContainer;
