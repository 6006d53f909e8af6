//! # Trellis Node
//!
//! Entry point for the Trellis ledger node.
//!
//! ## Process layout
//!
//! ```text
//! main
//!  ├── NodeConfig::from_env          environment overrides
//!  ├── init_tracing / register_metrics
//!  ├── SubsystemContainer::new       tl-01 .. tl-06 on one event bus
//!  ├── spawn_observers               one metrics task per topic
//!  ├── demo::run                     startup choreography (TL_DEMO=0 skips)
//!  └── ctrl_c → shutdown             signal observers, drain, exit
//! ```
//!
//! All ledger logic lives in the subsystem crates; this binary only wires,
//! observes, and supervises. The same wiring is available as a library for
//! integration tests via [`node_runtime`].

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use node_runtime::wiring::spawn_observers;
use node_runtime::{demo, NodeConfig, SubsystemContainer};
use trellis_telemetry::{init_tracing, register_metrics};

/// The running node: the wired container plus its observer tasks.
struct NodeRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<SubsystemContainer>,
    /// Observer task handles, drained on shutdown.
    observers: Mutex<Vec<JoinHandle<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    /// Shutdown signal receiver, cloned into each observer.
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl NodeRuntime {
    fn new(config: NodeConfig) -> Self {
        let container = Arc::new(SubsystemContainer::new(config));
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Self {
            container,
            observers: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start observers and, unless disabled, the startup choreography.
    async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Trellis Node v{}", env!("CARGO_PKG_VERSION"));
        info!("  Subsystems: tl-01 .. tl-06");
        info!("===========================================");

        let handles = spawn_observers(&self.container.bus, &self.shutdown_rx);
        *self.observers.lock() = handles;
        info!("Bus observers started");

        if self.container.config.run_demo {
            demo::run(&self.container).context("startup choreography failed")?;
        } else {
            info!("Startup choreography disabled (TL_DEMO=0)");
        }

        info!(
            events = self.container.journal.len(),
            "All subsystems running"
        );
        Ok(())
    }

    /// Signal observers and wait for every task to drain.
    async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let handles = std::mem::take(&mut *self.observers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Observer task panicked during shutdown: {}", e);
            }
        }

        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env();

    init_tracing(&config.telemetry).context("tracing initialization")?;
    register_metrics().context("metrics registration")?;

    config.validate().context("configuration rejected")?;

    let runtime = NodeRuntime::new(config);
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    runtime.shutdown().await;
    Ok(())
}
