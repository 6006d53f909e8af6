//! # Event Journal
//!
//! The append-only audit log. Every emitted event is stamped with a
//! monotonic sequence number and retained in a ring bounded by a fixed
//! capacity; past that, the oldest records are evicted. Consumers
//! reconstruct history with [`EventJournal::events_since`] and must tolerate
//! evicted prefixes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::TimeSource;
use uuid::Uuid;

use crate::events::{EventEnvelope, LedgerEvent};
use crate::DEFAULT_JOURNAL_CAPACITY;

struct JournalInner {
    entries: VecDeque<EventEnvelope>,
    next_sequence: u64,
}

/// Sequence-numbered, ring-bounded record of every state change.
pub struct EventJournal {
    inner: RwLock<JournalInner>,
    time: Arc<dyn TimeSource>,
    capacity: usize,
}

impl EventJournal {
    /// Create a journal with the default retention capacity.
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self::with_capacity(DEFAULT_JOURNAL_CAPACITY, time)
    }

    /// Create a journal retaining at most `capacity` envelopes.
    pub fn with_capacity(capacity: usize, time: Arc<dyn TimeSource>) -> Self {
        Self {
            inner: RwLock::new(JournalInner {
                entries: VecDeque::with_capacity(capacity.min(1024)),
                next_sequence: 0,
            }),
            time,
            capacity: capacity.max(1),
        }
    }

    /// Append an event, assigning its sequence number and timestamp.
    pub fn record(&self, event: LedgerEvent) -> EventEnvelope {
        let mut inner = self.inner.write();
        let envelope = EventEnvelope {
            id: Uuid::new_v4(),
            sequence: inner.next_sequence,
            timestamp: self.time.now(),
            event,
        };
        inner.next_sequence += 1;
        if inner.entries.len() == self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(envelope.clone());
        envelope
    }

    /// All retained envelopes with `sequence >= since`, oldest first.
    pub fn events_since(&self, since: u64) -> Vec<EventEnvelope> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|e| e.sequence >= since)
            .cloned()
            .collect()
    }

    /// The `n` most recent envelopes, oldest first.
    pub fn recent(&self, n: usize) -> Vec<EventEnvelope> {
        let inner = self.inner.read();
        let skip = inner.entries.len().saturating_sub(n);
        inner.entries.iter().skip(skip).cloned().collect()
    }

    /// Number of envelopes currently retained.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the journal holds no envelopes.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Total events ever recorded, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.inner.read().next_sequence
    }

    /// Retention capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
