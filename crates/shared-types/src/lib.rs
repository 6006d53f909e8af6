//! # Shared Types Crate
//!
//! Domain primitives used by every Trellis subsystem: id aliases, the
//! governance-supplied parameter set, the capability probe, the error
//! taxonomy, and the time source.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Read-only configuration**: `GovernanceParams` is supplied by the
//!   governance layer and never mutated by the core.
//! - **Injected authority**: roles are decided by a [`CapabilityProbe`]
//!   handed to each service, never by inherited state.

pub mod capability;
pub mod config;
pub mod entities;
pub mod errors;
pub mod time;

pub use capability::*;
pub use config::*;
pub use entities::*;
pub use errors::*;
pub use time::*;
