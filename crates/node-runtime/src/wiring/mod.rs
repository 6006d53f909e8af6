//! # Subsystem Wiring
//!
//! Event-side wiring for one node. Subsystems never call each other
//! directly: commands flow through the port adapters in [`crate::adapters`],
//! and everything downstream of a committed write flows through the bus.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           EVENT BUS                              │
//! │        (shared-bus: journal + broadcast fan-out)                 │
//! └───────┬──────────────────────────────────────────────┬───────────┘
//!         │ emit (sync, after commit)                    │ subscribe
//!         │                                              ▼
//!  ┌──────┴──────┐                              ┌────────────────┐
//!  │ tl-01..06   │                              │ metric         │
//!  │ services    │                              │ observers      │
//!  └──────┬──────┘                              │ (one per topic)│
//!         │ ports                               └───────┬────────┘
//!         ▼                                             ▼
//!  ┌─────────────┐                              ┌────────────────┐
//!  │ adapters    │                              │ prometheus     │
//!  │ (this crate)│                              │ registry       │
//!  └─────────────┘                              └────────────────┘
//! ```
//!
//! Observers hold no service handles, so nothing they do can re-enter a
//! subsystem lock.

pub mod observers;

pub use observers::{observe, spawn_observers};
