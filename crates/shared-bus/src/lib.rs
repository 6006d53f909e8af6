//! # Shared Bus - Event Journal and Fan-Out
//!
//! Every state-changing call in Trellis emits exactly one event record. This
//! crate owns the record types, the append-only journal that is the system's
//! audit log, and the broadcast fan-out that lets runtime tasks observe
//! changes as they happen.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   emit()    ┌──────────────┐   broadcast   ┌────────────┐
//! │  Subsystem   │ ──────────► │  LedgerBus   │ ────────────► │ Subscriber │
//! │  (tl-01..06) │             │              │               │   tasks    │
//! └──────────────┘             │   journal ───┼── recent(n)   └────────────┘
//!                              └──────────────┘   events_since(seq)
//! ```
//!
//! ## Rules
//!
//! - Emission is synchronous: `emit` appends to the journal and pushes to the
//!   broadcast channel without suspension, so subsystem services stay free of
//!   async machinery.
//! - The journal is the only mechanism consumers may use to reconstruct
//!   history; it is sequence-numbered and ring-bounded.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod journal;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventEnvelope, EventFilter, EventTopic, LedgerEvent};
pub use journal::EventJournal;
pub use publisher::{EventSink, LedgerBus, RecordingSink};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Envelopes retained by the journal before the oldest are evicted.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 4096;
