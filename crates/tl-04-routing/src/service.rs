//! Routing service: serialized writes over the route, message, and batch
//! arenas.
//!
//! All validation runs before the first write of an operation, so a failed
//! call leaves no partial state. Batch processing walks its messages inside
//! one lock scope and emits the collected events afterwards, so observers
//! never see a half-processed batch.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_bus::{EventSink, LedgerEvent};
use shared_types::config::RoutingParams;
use shared_types::{Address, Capability, CapabilityProbe, MessageId, RouteKey, ShardId, TimeSource};

use crate::domain::entities::{CrossShardMessage, MessageBatch, Route};
use crate::domain::errors::{RoutingError, RoutingResult};
use crate::domain::invariants::{
    crosses_congestion_threshold, derive_message_id, invariant_batch_size,
    invariant_distinct_pair, invariant_payload_size,
};
use crate::domain::value_objects::{BatchStatus, MessageStatus, RouteStatus};
use crate::ports::inbound::{RouteMetrics, RoutingFabricApi};

#[derive(Debug, Default)]
struct RoutingStore {
    routes: HashMap<RouteKey, Route>,
    messages: HashMap<MessageId, CrossShardMessage>,
    batches: HashMap<Uuid, MessageBatch>,
    /// Messages claimed by a batch that has not yet reached a terminal
    /// status. Prevents double delivery through overlapping batches.
    claims: HashMap<MessageId, Uuid>,
    /// Send nonce folded into message ids.
    nonce: u64,
}

/// The routing fabric. Single-writer; every operation takes the store lock,
/// validates, commits, releases, then emits.
pub struct RoutingService {
    store: RwLock<RoutingStore>,
    params: RoutingParams,
    probe: Arc<dyn CapabilityProbe>,
    sink: Arc<dyn EventSink>,
    time: Arc<dyn TimeSource>,
}

impl RoutingService {
    /// Creates a fabric with the given parameter set and dependencies.
    pub fn new(
        params: RoutingParams,
        probe: Arc<dyn CapabilityProbe>,
        sink: Arc<dyn EventSink>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store: RwLock::new(RoutingStore::default()),
            params,
            probe,
            sink,
            time,
        }
    }

    fn emit_all(&self, events: Vec<LedgerEvent>) {
        for event in events {
            self.sink.emit(event);
        }
    }

    fn route_status_event(
        source: ShardId,
        target: ShardId,
        old: RouteStatus,
        new: RouteStatus,
    ) -> LedgerEvent {
        LedgerEvent::RouteStatusChanged {
            source,
            target,
            old_status: format!("{old:?}"),
            new_status: format!("{new:?}"),
        }
    }

    fn message_status_event(
        message_id: MessageId,
        old: MessageStatus,
        new: MessageStatus,
    ) -> LedgerEvent {
        LedgerEvent::MessageStatusChanged {
            message_id,
            old_status: format!("{old:?}"),
            new_status: format!("{new:?}"),
        }
    }

    /// Fails every Pending message on the pair and releases its load units.
    /// Runs when a route is withdrawn (`Failed` or `Inactive`), so dead pairs
    /// never keep live messages. Returns the emitted-events backlog.
    fn fail_live_messages(store: &mut RoutingStore, key: RouteKey) -> Vec<LedgerEvent> {
        let mut events = Vec::new();
        let mut stranded = 0u64;
        for msg in store
            .messages
            .values_mut()
            .filter(|m| (m.source, m.target) == key && m.status.holds_load())
        {
            let old = msg.status;
            msg.status = MessageStatus::Failed;
            events.push(Self::message_status_event(msg.id, old, MessageStatus::Failed));
            stranded += 1;
        }
        if let Some(route) = store.routes.get_mut(&key) {
            route.load = route.load.saturating_sub(stranded);
        }
        events
    }
}

impl RoutingFabricApi for RoutingService {
    fn establish_route(
        &self,
        source: ShardId,
        target: ShardId,
        capacity: u64,
        latency_ms: u64,
    ) -> RoutingResult<Route> {
        invariant_distinct_pair(source, target)?;

        let mut store = self.store.write();
        if let Some(existing) = store.routes.get(&(source, target)) {
            if !existing.status.is_replaceable() {
                return Err(RoutingError::RouteExists { source, target });
            }
        }

        let route = Route::new(source, target, capacity, latency_ms, self.time.now());
        store.routes.insert((source, target), route.clone());
        drop(store);

        info!(source, target, capacity, latency_ms, "route established");
        self.sink.emit(LedgerEvent::RouteEstablished {
            source,
            target,
            capacity,
            latency_ms,
        });
        Ok(route)
    }

    fn send_message(
        &self,
        source: ShardId,
        target: ShardId,
        sender: Address,
        recipient: Address,
        payload: Vec<u8>,
    ) -> RoutingResult<MessageId> {
        let mut store = self.store.write();
        let route = store
            .routes
            .get(&(source, target))
            .ok_or(RoutingError::RouteNotFound { source, target })?;

        if route.status == RouteStatus::Congested {
            return Err(RoutingError::RouteCongested { source, target });
        }
        if !route.status.accepts_traffic() {
            return Err(RoutingError::RouteInactive {
                source,
                target,
                status: format!("{:?}", route.status),
            });
        }
        invariant_payload_size(&payload, self.params.max_payload_bytes)?;

        let now = self.time.now();
        let nonce = store.nonce;
        let id = derive_message_id(&sender, source, target, &payload, nonce);
        let expires_at = now + self.params.message_ttl_secs;
        let message = CrossShardMessage {
            id,
            source,
            target,
            sender,
            recipient,
            payload,
            sent_at: now,
            expires_at,
            status: MessageStatus::Pending,
        };
        store.nonce += 1;
        store.messages.insert(id, message);

        // The tipping send is accepted; the next one is rejected.
        let mut congested = false;
        let mut load = 0;
        let mut capacity = 0;
        if let Some(route) = store.routes.get_mut(&(source, target)) {
            route.load += 1;
            load = route.load;
            capacity = route.capacity;
            if crosses_congestion_threshold(
                load,
                capacity,
                self.params.congestion_threshold_percent,
            ) {
                route.transition_to(RouteStatus::Congested)?;
                congested = true;
            }
        }
        drop(store);

        debug!(
            source,
            target,
            message = %shared_types::short_hash(&id),
            expires_at,
            "message accepted"
        );
        self.sink.emit(LedgerEvent::MessageSent {
            message_id: id,
            source,
            target,
            sender,
            expires_at,
        });
        if congested {
            warn!(source, target, load, capacity, "route congested");
            self.sink.emit(Self::route_status_event(
                source,
                target,
                RouteStatus::Active,
                RouteStatus::Congested,
            ));
        }
        Ok(id)
    }

    fn create_batch(
        &self,
        source: ShardId,
        target: ShardId,
        message_ids: Vec<MessageId>,
    ) -> RoutingResult<Uuid> {
        invariant_batch_size(message_ids.len(), self.params.max_batch_size)?;

        let mut store = self.store.write();
        for (i, id) in message_ids.iter().enumerate() {
            let msg = store
                .messages
                .get(id)
                .filter(|m| (m.source, m.target) == (source, target))
                .ok_or(RoutingError::UnknownMessage(*id))?;
            if msg.status != MessageStatus::Pending {
                return Err(RoutingError::MessageNotPending {
                    message_id: *id,
                    status: format!("{:?}", msg.status),
                });
            }
            if let Some(batch_id) = store.claims.get(id) {
                return Err(RoutingError::MessageAlreadyBatched {
                    message_id: *id,
                    batch_id: *batch_id,
                });
            }
            if message_ids[..i].contains(id) {
                return Err(RoutingError::MessageAlreadyBatched {
                    message_id: *id,
                    batch_id: Uuid::nil(),
                });
            }
        }

        let batch_id = Uuid::new_v4();
        let message_count = message_ids.len();
        for id in &message_ids {
            store.claims.insert(*id, batch_id);
        }
        store.batches.insert(
            batch_id,
            MessageBatch {
                id: batch_id,
                source,
                target,
                message_ids,
                status: BatchStatus::Pending,
                created_at: self.time.now(),
            },
        );
        drop(store);

        info!(source, target, %batch_id, message_count, "batch created");
        self.sink.emit(LedgerEvent::BatchCreated {
            batch_id,
            source,
            target,
            message_count,
        });
        Ok(batch_id)
    }

    fn process_batch(&self, batch_id: Uuid) -> RoutingResult<()> {
        let mut store = self.store.write();
        let batch = store
            .batches
            .get(&batch_id)
            .ok_or(RoutingError::UnknownBatch(batch_id))?;
        if batch.status != BatchStatus::Pending {
            return Err(RoutingError::BatchNotPending {
                batch_id,
                status: format!("{:?}", batch.status),
            });
        }
        let key = batch.key();
        let ids = batch.message_ids.clone();

        let route = store
            .routes
            .get(&key)
            .ok_or(RoutingError::RouteNotFound { source: key.0, target: key.1 })?;
        if !route.status.can_drain() {
            // Parked, not failed: the batch stays Pending for a retry once
            // the route returns to service.
            return Err(RoutingError::RouteInactive {
                source: key.0,
                target: key.1,
                status: format!("{:?}", route.status),
            });
        }

        if let Some(b) = store.batches.get_mut(&batch_id) {
            b.status = BatchStatus::Processing;
        }
        let now = self.time.now();
        let window = self.params.success_window;
        let mut events = Vec::new();
        let mut delivered = 0usize;
        let mut failure: Option<MessageId> = None;

        for id in &ids {
            let Some(msg) = store.messages.get_mut(id) else {
                failure = Some(*id);
                break;
            };
            // A message withdrawn under the batch (route shutdown) aborts it.
            if msg.status != MessageStatus::Pending {
                failure = Some(*id);
                break;
            }
            msg.transition_to(MessageStatus::InTransit)?;
            events.push(Self::message_status_event(
                *id,
                MessageStatus::Pending,
                MessageStatus::InTransit,
            ));

            let expired = msg.is_expired(now);
            let terminal = if expired {
                MessageStatus::Expired
            } else {
                MessageStatus::Delivered
            };
            msg.transition_to(terminal)?;
            events.push(Self::message_status_event(*id, MessageStatus::InTransit, terminal));

            if let Some(route) = store.routes.get_mut(&key) {
                route.drain_one();
                route.record_outcome(!expired, window);
            }
            if expired {
                failure = Some(*id);
                break;
            }
            delivered += 1;
        }

        let final_status = if failure.is_some() {
            BatchStatus::Failed
        } else {
            BatchStatus::Completed
        };
        if let Some(b) = store.batches.get_mut(&batch_id) {
            b.status = final_status;
        }
        for id in &ids {
            store.claims.remove(id);
        }
        drop(store);

        self.emit_all(events);
        match failure {
            Some(failed_message) => {
                warn!(
                    %batch_id,
                    failed = %shared_types::short_hash(&failed_message),
                    delivered,
                    "batch failed"
                );
                self.sink.emit(LedgerEvent::BatchFailed {
                    batch_id,
                    failed_message,
                    delivered_before_failure: delivered,
                });
            }
            None => {
                info!(%batch_id, delivered, "batch completed");
                self.sink.emit(LedgerEvent::BatchCompleted { batch_id, delivered });
            }
        }
        Ok(())
    }

    fn acknowledge_message(&self, message_id: MessageId, caller: &Address) -> RoutingResult<()> {
        let mut store = self.store.write();
        let msg = store
            .messages
            .get_mut(&message_id)
            .ok_or(RoutingError::UnknownMessage(message_id))?;

        if msg.recipient != *caller {
            return Err(RoutingError::NotRecipient);
        }
        if msg.status != MessageStatus::Delivered {
            return Err(RoutingError::MessageNotDelivered {
                message_id,
                status: format!("{:?}", msg.status),
            });
        }
        msg.transition_to(MessageStatus::Acknowledged)?;
        drop(store);

        debug!(message = %shared_types::short_hash(&message_id), "message acknowledged");
        self.sink.emit(Self::message_status_event(
            message_id,
            MessageStatus::Delivered,
            MessageStatus::Acknowledged,
        ));
        Ok(())
    }

    fn update_route_status(
        &self,
        caller: &Address,
        source: ShardId,
        target: ShardId,
        status: RouteStatus,
    ) -> RoutingResult<()> {
        if !self.probe.has_capability(caller, &Capability::Administrator) {
            return Err(RoutingError::NotAuthorized { action: "update_route_status" });
        }

        let mut store = self.store.write();
        let route = store
            .routes
            .get_mut(&(source, target))
            .ok_or(RoutingError::RouteNotFound { source, target })?;
        let old = route.status;

        if old == RouteStatus::Congested
            && status == RouteStatus::Active
            && crosses_congestion_threshold(
                route.load,
                route.capacity,
                self.params.congestion_threshold_percent,
            )
        {
            return Err(RoutingError::StillCongested {
                load: route.load,
                capacity: route.capacity,
            });
        }
        route.transition_to(status)?;

        // Withdrawing a route strands its undelivered messages.
        let mut events = Vec::new();
        if matches!(status, RouteStatus::Failed | RouteStatus::Inactive) {
            events = Self::fail_live_messages(&mut store, (source, target));
        }
        drop(store);

        warn!(source, target, from = ?old, to = ?status, "route status overridden");
        self.sink
            .emit(Self::route_status_event(source, target, old, status));
        self.emit_all(events);
        Ok(())
    }

    fn route_metrics(&self, source: ShardId, target: ShardId) -> Option<RouteMetrics> {
        let store = self.store.read();
        store.routes.get(&(source, target)).map(|r| RouteMetrics {
            source,
            target,
            status: r.status,
            capacity: r.capacity,
            load: r.load,
            latency_ms: r.latency_ms,
            success_rate: r.success_rate(),
            window_len: r.recent_outcomes.len(),
        })
    }

    fn route(&self, source: ShardId, target: ShardId) -> Option<Route> {
        self.store.read().routes.get(&(source, target)).cloned()
    }

    fn routes(&self) -> Vec<Route> {
        let store = self.store.read();
        let mut out: Vec<Route> = store.routes.values().cloned().collect();
        out.sort_by_key(Route::key);
        out
    }

    fn message(&self, message_id: MessageId) -> Option<CrossShardMessage> {
        self.store.read().messages.get(&message_id).cloned()
    }

    fn batch(&self, batch_id: Uuid) -> Option<MessageBatch> {
        self.store.read().batches.get(&batch_id).cloned()
    }

    fn route_count(&self) -> usize {
        self.store.read().routes.len()
    }
}
