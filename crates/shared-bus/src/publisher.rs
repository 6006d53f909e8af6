//! # Event Emission
//!
//! The emitting side of the bus. Subsystem services hold a `dyn EventSink`
//! and call [`EventSink::emit`] after each committed state change; emission
//! never suspends, so services stay synchronous.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

use crate::events::{EventEnvelope, EventFilter, LedgerEvent};
use crate::journal::EventJournal;
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Sink for event records. Implementations must not block.
pub trait EventSink: Send + Sync {
    /// Record one event. Called after the state change has been applied.
    fn emit(&self, event: LedgerEvent);
}

/// The production bus: journals every event and fans it out to subscribers.
///
/// Built on `tokio::sync::broadcast`; `send` on a broadcast channel does not
/// suspend, so emission stays synchronous. Subscribers that fall behind the
/// channel capacity lose intermediate events but can re-read the journal.
pub struct LedgerBus {
    journal: Arc<EventJournal>,
    sender: broadcast::Sender<EventEnvelope>,
}

impl LedgerBus {
    /// Create a bus with the default subscriber buffer.
    pub fn new(journal: Arc<EventJournal>) -> Self {
        Self::with_channel_capacity(journal, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with an explicit subscriber buffer size.
    pub fn with_channel_capacity(journal: Arc<EventJournal>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { journal, sender }
    }

    /// Subscribe to envelopes matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Subscribe as a `Stream` for combinator-style consumers.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// The journal backing this bus.
    pub fn journal(&self) -> Arc<EventJournal> {
        Arc::clone(&self.journal)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSink for LedgerBus {
    fn emit(&self, event: LedgerEvent) {
        let envelope = self.journal.record(event);
        trace!(
            sequence = envelope.sequence,
            tag = envelope.event.subsystem_tag(),
            "event journaled"
        );
        // A send error only means no subscriber is listening right now; the
        // journal already holds the record.
        let _ = self.sender.send(envelope);
    }
}

/// Sink that stores raw events in memory, for unit tests and inspection.
#[derive(Default)]
pub struct RecordingSink {
    events: RwLock<Vec<LedgerEvent>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    /// Number of events emitted so far.
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: LedgerEvent) {
        self.events.write().push(event);
    }
}
