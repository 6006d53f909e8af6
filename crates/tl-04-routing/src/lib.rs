//! # TL-04: Routing Fabric
//!
//! Cross-shard message transport: directional routes with capacity and
//! latency figures, content-addressed messages with a TTL, ordered batches
//! with all-or-nothing completion, and a congestion circuit breaker.
//!
//! ## Architecture
//!
//! This crate follows the hexagonal (ports and adapters) pattern:
//! - `domain/` - Pure business logic: entities, value objects, invariants
//! - `ports/` - Interface definitions (inbound API)
//! - `service` - The fabric service implementing the inbound port
//!
//! ## Congestion
//!
//! A send that puts a route's load at or above the congestion threshold
//! flips it `Congested`; the tipping message is accepted and every later
//! send is rejected until an administrator clears the route. Clearing is
//! refused while load still sits at the threshold, so the breaker cannot
//! flap. Batch processing keeps draining congested routes; that is the
//! recovery path.
//!
//! ## Batches
//!
//! A batch claims Pending messages and walks them in submission order. The
//! first expired message fails the whole batch; messages already delivered
//! keep their status and the rest stay Pending for resubmission.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{CrossShardMessage, MessageBatch, Route};
pub use domain::errors::{RoutingError, RoutingResult};
pub use domain::value_objects::{BatchStatus, MessageStatus, RouteStatus};
pub use ports::inbound::{RouteMetrics, RoutingFabricApi};
pub use service::RoutingService;

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
