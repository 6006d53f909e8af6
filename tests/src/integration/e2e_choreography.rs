//! End-to-end run of the startup choreography, observed from the event plane.
//!
//! The demo drives every subsystem once through the real wiring; these tests
//! replay it on a manual clock and check the side the demo itself never
//! inspects: journal sequencing, topic coverage, cursor-based catch-up, and
//! live subscriptions that were attached before the first event fired.

#[cfg(test)]
mod tests {
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use shared_types::ManualTimeSource;

    use node_runtime::{demo, NodeConfig, SubsystemContainer};

    const START: u64 = 1_000_000;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn choreographed_container() -> SubsystemContainer {
        SubsystemContainer::with_clock(
            NodeConfig::default(),
            ManualTimeSource::starting_at(START),
        )
    }

    // =========================================================================
    // JOURNAL COHERENCE
    // =========================================================================

    #[test]
    fn test_journal_sequences_are_gapless_from_zero() {
        let container = choreographed_container();
        demo::run(&container).unwrap();

        let envelopes = container.journal.events_since(0);
        assert!(!envelopes.is_empty());

        let sequences: Vec<u64> = envelopes.iter().map(|e| e.sequence).collect();
        let expected: Vec<u64> = (0..envelopes.len() as u64).collect();
        assert_eq!(sequences, expected);
        assert_eq!(container.journal.total_recorded(), envelopes.len() as u64);
    }

    #[test]
    fn test_envelopes_are_stamped_from_the_shared_clock() {
        let container = choreographed_container();
        demo::run(&container).unwrap();

        // The choreography never advances the manual clock, so every record
        // must carry the same instant.
        assert!(container
            .journal
            .events_since(0)
            .iter()
            .all(|e| e.timestamp == START));
    }

    #[test]
    fn test_every_subsystem_reports_into_the_journal() {
        let container = choreographed_container();
        demo::run(&container).unwrap();

        let topics: Vec<EventTopic> = container
            .journal
            .events_since(0)
            .iter()
            .map(|e| e.event.topic())
            .collect();

        for expected in [
            EventTopic::Validators,
            EventTopic::Consensus,
            EventTopic::Shards,
            EventTopic::Routing,
            EventTopic::Bridge,
            EventTopic::Channels,
        ] {
            assert!(topics.contains(&expected), "missing topic {expected:?}");
        }
    }

    #[test]
    fn test_events_since_resumes_from_a_cursor() {
        let container = choreographed_container();
        demo::run(&container).unwrap();
        let cursor = container.journal.total_recorded();

        // A second pass must land entirely past the saved cursor.
        demo::run(&container).unwrap();
        let tail = container.journal.events_since(cursor);

        assert!(!tail.is_empty());
        assert_eq!(tail[0].sequence, cursor);
        assert!(tail.iter().all(|e| e.sequence >= cursor));
        assert_eq!(
            container.journal.total_recorded(),
            cursor + tail.len() as u64
        );
    }

    // =========================================================================
    // LIVE SUBSCRIPTIONS
    // =========================================================================

    #[test]
    fn test_topic_filter_narrows_a_subscription_to_one_subsystem() {
        let container = choreographed_container();
        let mut subscription = container
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Channels]));

        demo::run(&container).unwrap();

        let mut received = Vec::new();
        while let Some(envelope) = subscription.try_recv().unwrap() {
            received.push(envelope);
        }

        // Two channel lifecycles ran: one settled, one escalated.
        assert!(received.len() >= 6);
        assert!(received
            .iter()
            .all(|e| e.event.topic() == EventTopic::Channels));
        assert_eq!(
            received
                .iter()
                .filter(|e| matches!(e.event, LedgerEvent::ChannelOpened { .. }))
                .count(),
            2
        );
        assert!(received
            .iter()
            .any(|e| matches!(e.event, LedgerEvent::ChannelClosed { .. })));
    }

    #[tokio::test]
    async fn test_subscriber_attached_before_startup_sees_the_first_event() {
        let container = choreographed_container();
        let mut subscription = container.bus.subscribe(EventFilter::all());

        demo::run(&container).unwrap();

        let first = subscription.recv().await.unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(first.event.topic(), EventTopic::Validators);
    }
}
