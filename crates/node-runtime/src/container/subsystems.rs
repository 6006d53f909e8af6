//! # Subsystem Container
//!
//! Holds the six subsystem services plus the shared infrastructure they
//! hang off: the event bus, its journal, the capability table, and the
//! clock.
//!
//! ## Initialization Order
//!
//! Services initialize in dependency order so every adapter wraps an
//! already-built peer:
//!
//! ```text
//! Phase 1: bus, journal, capability table
//! Phase 2: validator registry (tl-01)
//! Phase 3: shard registry (tl-03)
//! Phase 4: consensus engine (tl-02, adapters over tl-01 and tl-03)
//! Phase 5: routing fabric (tl-04)
//! Phase 6: channel bridge (tl-05, census over tl-01)
//! Phase 7: channel ledger (tl-06, gateway over tl-05)
//! ```
//!
//! ## Thread Safety
//!
//! Every service is `Arc`-shared and internally synchronized; the container
//! itself is immutable after construction.

use std::sync::Arc;

use tracing::{info, instrument};

use shared_bus::{EventJournal, EventSink, LedgerBus, DEFAULT_JOURNAL_CAPACITY};
use shared_types::{
    Capability, CapabilityProbe, StaticCapabilityTable, SystemTimeSource, TimeSource,
};
use tl_01_validators::{InMemoryStakeVault, RegistryService};
use tl_02_consensus::ConsensusEngine;
use tl_03_shards::ShardRegistryService;
use tl_04_routing::RoutingService;
use tl_05_bridge::{ChannelBridgeService, RecoveringVerifier};
use tl_06_channels::ChannelLedgerService;

use crate::adapters::{BridgeChannelGateway, RegistryCensus, RegistryDirectory, ShardRootSink};
use crate::container::config::NodeConfig;

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Validator registry (subsystem 1).
    pub registry: Arc<RegistryService>,
    /// Per-shard consensus engine (subsystem 2).
    pub consensus: Arc<ConsensusEngine>,
    /// Shard registry (subsystem 3).
    pub shards: Arc<ShardRegistryService>,
    /// Cross-shard routing fabric (subsystem 4).
    pub routing: Arc<RoutingService>,
    /// Channel bridge (subsystem 5).
    pub bridge: Arc<ChannelBridgeService>,
    /// Off-chain channel ledger (subsystem 6).
    pub channels: Arc<ChannelLedgerService>,
    /// Event bus every service emits into.
    pub bus: Arc<LedgerBus>,
    /// Journal backing the bus.
    pub journal: Arc<EventJournal>,
    /// Capability table holding the operator's grants.
    pub probe: Arc<StaticCapabilityTable>,
    /// Clock shared by every subsystem.
    pub time: Arc<dyn TimeSource>,
    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl SubsystemContainer {
    /// Build a container on the system clock.
    pub fn new(config: NodeConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemTimeSource))
    }

    /// Build a container on an explicit clock. Integration tests drive a
    /// manual clock through deadline and timelock scenarios.
    #[instrument(name = "subsystem_init", skip_all)]
    pub fn with_clock(config: NodeConfig, time: Arc<dyn TimeSource>) -> Self {
        info!("Initializing Trellis subsystem container");

        // =====================================================================
        // PHASE 1: Shared infrastructure
        // =====================================================================
        info!("Phase 1: Creating shared infrastructure");

        let journal = Arc::new(EventJournal::with_capacity(
            DEFAULT_JOURNAL_CAPACITY,
            Arc::clone(&time),
        ));
        let bus = Arc::new(LedgerBus::new(Arc::clone(&journal)));
        let sink: Arc<dyn EventSink> = bus.clone();

        let probe = Arc::new(StaticCapabilityTable::new());
        probe.grant(config.operator, Capability::Administrator);
        let probe_dyn: Arc<dyn CapabilityProbe> = probe.clone();

        // =====================================================================
        // PHASE 2: Validator registry
        // =====================================================================
        info!("Phase 2: Initializing validator registry");

        let registry = Arc::new(RegistryService::new(
            config.params.validators.clone(),
            Arc::clone(&probe_dyn),
            Arc::new(InMemoryStakeVault::new()),
            Arc::clone(&sink),
            Arc::clone(&time),
        ));
        info!(
            "  [tl-01] Validator registry initialized (min stake {})",
            config.params.validators.min_stake
        );

        // =====================================================================
        // PHASE 3: Shard registry
        // =====================================================================
        info!("Phase 3: Initializing shard registry");

        let shards = Arc::new(ShardRegistryService::new(
            config.params.shards.clone(),
            Arc::clone(&probe_dyn),
            Arc::clone(&sink),
            Arc::clone(&time),
        ));
        info!(
            "  [tl-03] Shard registry initialized (rebalance at {}%)",
            config.params.shards.rebalance_threshold_percent
        );

        // =====================================================================
        // PHASE 4: Consensus engine over registry and shard adapters
        // =====================================================================
        info!("Phase 4: Initializing consensus engine");

        let consensus = Arc::new(ConsensusEngine::new(
            config.params.consensus.clone(),
            Arc::clone(&probe_dyn),
            Arc::new(RegistryDirectory::new(Arc::clone(&registry))),
            Arc::new(ShardRootSink::new(Arc::clone(&shards))),
            Arc::clone(&sink),
            Arc::clone(&time),
        ));
        info!(
            "  [tl-02] Consensus engine initialized (rounds of {}s, approval {}%)",
            config.params.consensus.round_duration_secs, config.params.consensus.approval_percent
        );

        // =====================================================================
        // PHASE 5: Routing fabric
        // =====================================================================
        info!("Phase 5: Initializing routing fabric");

        let routing = Arc::new(RoutingService::new(
            config.params.routing.clone(),
            Arc::clone(&probe_dyn),
            Arc::clone(&sink),
            Arc::clone(&time),
        ));
        info!(
            "  [tl-04] Routing fabric initialized (batches of {}, congestion at {}%)",
            config.params.routing.max_batch_size, config.params.routing.congestion_threshold_percent
        );

        // =====================================================================
        // PHASE 6: Channel bridge with key recovery and registry census
        // =====================================================================
        info!("Phase 6: Initializing channel bridge");

        let bridge = Arc::new(ChannelBridgeService::new(
            config.params.bridge.clone(),
            Arc::new(RecoveringVerifier::new()),
            Arc::new(RegistryCensus::new(Arc::clone(&registry))),
            Arc::clone(&sink),
            Arc::clone(&time),
        ));
        info!(
            "  [tl-05] Channel bridge initialized (dispute window {}s)",
            config.params.bridge.dispute_window_secs
        );

        // =====================================================================
        // PHASE 7: Channel ledger over the bridge gateway
        // =====================================================================
        info!("Phase 7: Initializing channel ledger");

        let channels = Arc::new(ChannelLedgerService::new(
            config.params.channels.clone(),
            Arc::new(BridgeChannelGateway::new(Arc::clone(&bridge))),
            Arc::clone(&sink),
            Arc::clone(&time),
        ));
        info!(
            "  [tl-06] Channel ledger initialized (HTLC cap {}, settle timeout {}s)",
            config.params.channels.max_htlcs_per_channel,
            config.params.channels.settle_timeout_secs
        );

        info!("All subsystems initialized successfully");

        Self {
            registry,
            consensus,
            shards,
            routing,
            bridge,
            channels,
            bus,
            journal,
            probe,
            time,
            config,
        }
    }

    /// The event bus for subscribing and publishing.
    pub fn bus(&self) -> Arc<LedgerBus> {
        Arc::clone(&self.bus)
    }

    /// The journal backing the bus.
    pub fn journal(&self) -> Arc<EventJournal> {
        Arc::clone(&self.journal)
    }
}
