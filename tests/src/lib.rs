//! # Trellis Test Suite
//!
//! Unified test crate for cross-subsystem behavior. Single-subsystem unit
//! tests live with their crates; everything here drives two or more
//! subsystems through the real runtime wiring.
//!
//! ## Structure
//!
//! ```text
//! tests/src/integration/
//! ├── channel_scenarios.rs    # HTLC settle, wrong preimage, expiry, refund
//! ├── consensus_flows.rs      # round lifecycle, finalized roots into shards
//! ├── dispute_flows.rs        # escalation, arbitration, resolution
//! ├── e2e_choreography.rs     # the full startup choreography end to end
//! ├── routing_scenarios.rs    # congestion, batch all-or-nothing
//! └── shard_scenarios.rs      # rebalance trigger and cooldown
//!
//! tests/benches/
//! └── subsystem_benchmarks.rs # criterion throughput benchmarks
//! ```
//!
//! ## Running
//!
//! ```bash
//! cargo test -p trellis-tests
//! cargo test -p trellis-tests integration::dispute_flows
//! cargo bench -p trellis-tests
//! ```

pub mod integration;
