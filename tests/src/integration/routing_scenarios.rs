//! Route congestion and batch delivery across shard pairs.
//!
//! Capacity here is counted in messages: every accepted message holds one
//! load unit until a batch drains it. Congestion and batching therefore
//! interact through the same load figure, which is what these tests pin
//! down.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_bus::LedgerEvent;
    use shared_types::{Address, ManualTimeSource, MessageId};
    use tl_04_routing::{BatchStatus, MessageStatus, RouteStatus, RoutingError, RoutingFabricApi};

    use node_runtime::{NodeConfig, SubsystemContainer};

    const START: u64 = 1_000_000;
    const SENDER: Address = [0xa1; 20];
    const RECIPIENT: Address = [0xb2; 20];

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn live_container() -> (SubsystemContainer, Arc<ManualTimeSource>) {
        let time = ManualTimeSource::starting_at(START);
        let container = SubsystemContainer::with_clock(NodeConfig::default(), time.clone());
        (container, time)
    }

    fn send(container: &SubsystemContainer, source: u16, target: u16, tag: u8) -> MessageId {
        container
            .routing
            .send_message(source, target, SENDER, RECIPIENT, vec![tag; 8])
            .unwrap()
    }

    // =========================================================================
    // CONGESTION
    // =========================================================================

    #[test]
    fn test_route_congests_at_the_threshold_and_rejects_further_sends() {
        let (container, _) = live_container();
        // Capacity 10, so each message is 10% of the route. The default
        // congestion threshold is 80%.
        container.routing.establish_route(0, 1, 10, 5).unwrap();

        for tag in 0..7 {
            send(&container, 0, 1, tag);
        }
        assert_eq!(container.routing.route(0, 1).unwrap().status, RouteStatus::Active);

        // The eighth message tips the route; it is accepted, further sends
        // are not.
        send(&container, 0, 1, 7);
        let route = container.routing.route(0, 1).unwrap();
        assert_eq!(route.status, RouteStatus::Congested);
        assert_eq!(route.load, 8);

        let err = container
            .routing
            .send_message(0, 1, SENDER, RECIPIENT, vec![8; 8])
            .unwrap_err();
        assert_eq!(err, RoutingError::RouteCongested { source: 0, target: 1 });
    }

    #[test]
    fn test_congestion_is_directional() {
        let (container, _) = live_container();
        container.routing.establish_route(0, 1, 10, 5).unwrap();
        container.routing.establish_route(1, 0, 10, 5).unwrap();

        for tag in 0..8 {
            send(&container, 0, 1, tag);
        }
        assert_eq!(
            container.routing.route(0, 1).unwrap().status,
            RouteStatus::Congested
        );

        // The reverse pair is a different route with its own load.
        assert_eq!(container.routing.route(1, 0).unwrap().status, RouteStatus::Active);
        send(&container, 1, 0, 0);
    }

    // =========================================================================
    // BATCH DELIVERY
    // =========================================================================

    #[test]
    fn test_completed_batch_drains_the_route() {
        let (container, _) = live_container();
        container.routing.establish_route(2, 3, 100, 5).unwrap();

        let ids: Vec<MessageId> = (0..3).map(|tag| send(&container, 2, 3, tag)).collect();
        assert_eq!(container.routing.route(2, 3).unwrap().load, 3);

        let batch_id = container.routing.create_batch(2, 3, ids.clone()).unwrap();
        container.routing.process_batch(batch_id).unwrap();

        assert_eq!(
            container.routing.batch(batch_id).unwrap().status,
            BatchStatus::Completed
        );
        assert_eq!(container.routing.route(2, 3).unwrap().load, 0);
        for id in &ids {
            assert_eq!(
                container.routing.message(*id).unwrap().status,
                MessageStatus::Delivered
            );
        }

        let metrics = container.routing.route_metrics(2, 3).unwrap();
        assert_eq!(metrics.success_rate, Some(1.0));
    }

    #[test]
    fn test_one_expired_message_fails_the_whole_batch() {
        let (container, time) = live_container();
        container.routing.establish_route(2, 3, 100, 5).unwrap();

        // One message sent long ago, two fresh ones. Default TTL is 300
        // seconds, so the old message is dead by the time the batch runs.
        let stale = send(&container, 2, 3, 0);
        time.advance(301);
        let fresh: Vec<MessageId> = (1..3).map(|tag| send(&container, 2, 3, tag)).collect();

        let batch_id = container
            .routing
            .create_batch(2, 3, vec![fresh[0], fresh[1], stale])
            .unwrap();
        container.routing.process_batch(batch_id).unwrap();

        // Prior deliveries stand, but the batch itself is Failed.
        assert_eq!(
            container.routing.batch(batch_id).unwrap().status,
            BatchStatus::Failed
        );
        assert_eq!(
            container.routing.message(fresh[0]).unwrap().status,
            MessageStatus::Delivered
        );
        assert_eq!(
            container.routing.message(stale).unwrap().status,
            MessageStatus::Expired
        );
        assert!(container.journal.events_since(0).iter().any(|e| matches!(
            e.event,
            LedgerEvent::BatchFailed {
                failed_message,
                delivered_before_failure: 2,
                ..
            } if failed_message == stale
        )));
    }

    #[test]
    fn test_failed_batch_releases_claims_for_retry() {
        let (container, time) = live_container();
        container.routing.establish_route(2, 3, 100, 5).unwrap();

        let stale = send(&container, 2, 3, 0);
        time.advance(301);
        let fresh = send(&container, 2, 3, 1);

        // The fresh message sits behind the stale one, so the failure
        // leaves it Pending and reclaimable.
        let batch_id = container
            .routing
            .create_batch(2, 3, vec![stale, fresh])
            .unwrap();
        container.routing.process_batch(batch_id).unwrap();
        assert_eq!(
            container.routing.message(fresh).unwrap().status,
            MessageStatus::Pending
        );

        let retry = container.routing.create_batch(2, 3, vec![fresh]).unwrap();
        container.routing.process_batch(retry).unwrap();
        assert_eq!(
            container.routing.batch(retry).unwrap().status,
            BatchStatus::Completed
        );
    }

    // =========================================================================
    // ACKNOWLEDGEMENT
    // =========================================================================

    #[test]
    fn test_only_the_recipient_acknowledges() {
        let (container, _) = live_container();
        container.routing.establish_route(2, 3, 100, 5).unwrap();

        let id = send(&container, 2, 3, 0);
        let batch_id = container.routing.create_batch(2, 3, vec![id]).unwrap();
        container.routing.process_batch(batch_id).unwrap();

        let err = container.routing.acknowledge_message(id, &SENDER).unwrap_err();
        assert_eq!(err, RoutingError::NotRecipient);

        container.routing.acknowledge_message(id, &RECIPIENT).unwrap();
        assert_eq!(
            container.routing.message(id).unwrap().status,
            MessageStatus::Acknowledged
        );
    }
}
