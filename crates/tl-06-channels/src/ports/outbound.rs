//! Outbound port: the ledger's view of the channel bridge.

use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use thiserror::Error;

use shared_types::{Address, Amount, ChannelId};

/// Refusal from the bridge.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct GatewayRejection(pub String);

/// The bridge operations the ledger drives.
///
/// The ledger never holds a bridge reference; all coupling goes through
/// this port, and a refusal aborts the ledger operation before any local
/// write.
pub trait BridgeGateway: Send + Sync {
    /// Registers a channel and returns the bridge-derived id.
    fn register_channel(
        &self,
        participants: &[Address],
        capacity: Amount,
        opened_at: u64,
    ) -> Result<ChannelId, GatewayRejection>;

    /// Opens a dispute on the bridge on behalf of a participant.
    fn submit_dispute(
        &self,
        channel_id: ChannelId,
        disputant: Address,
        proof: Vec<u8>,
    ) -> Result<(), GatewayRejection>;

    /// Retires the bridge record after the ledger closes the channel.
    fn deactivate_channel(&self, channel_id: ChannelId) -> Result<(), GatewayRejection>;
}

/// Gateway backed by in-process lists, for tests and standalone use.
///
/// Derives ids the way the bridge does (hash over participants, capacity,
/// and timestamp) and records every call for inspection. A scripted refusal
/// makes all calls fail until cleared.
#[derive(Debug, Default)]
pub struct MemoryBridgeGateway {
    registered: RwLock<Vec<ChannelId>>,
    disputes: RwLock<Vec<(ChannelId, Address)>>,
    deactivated: RwLock<Vec<ChannelId>>,
    refusal: RwLock<Option<String>>,
}

impl MemoryBridgeGateway {
    /// Creates an accepting gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call refuse with `reason`; `None` clears it.
    pub fn script_refusal(&self, reason: Option<&str>) {
        *self.refusal.write() = reason.map(str::to_string);
    }

    /// Channel ids registered so far.
    pub fn registered(&self) -> Vec<ChannelId> {
        self.registered.read().clone()
    }

    /// Disputes submitted so far.
    pub fn disputes(&self) -> Vec<(ChannelId, Address)> {
        self.disputes.read().clone()
    }

    /// Channel ids deactivated so far.
    pub fn deactivated(&self) -> Vec<ChannelId> {
        self.deactivated.read().clone()
    }

    fn check_refusal(&self) -> Result<(), GatewayRejection> {
        match &*self.refusal.read() {
            Some(reason) => Err(GatewayRejection(reason.clone())),
            None => Ok(()),
        }
    }
}

impl BridgeGateway for MemoryBridgeGateway {
    fn register_channel(
        &self,
        participants: &[Address],
        capacity: Amount,
        opened_at: u64,
    ) -> Result<ChannelId, GatewayRejection> {
        self.check_refusal()?;
        let mut hasher = Sha256::new();
        for p in participants {
            hasher.update(p);
        }
        hasher.update(capacity.to_be_bytes());
        hasher.update(opened_at.to_be_bytes());
        let id: ChannelId = hasher.finalize().into();
        self.registered.write().push(id);
        Ok(id)
    }

    fn submit_dispute(
        &self,
        channel_id: ChannelId,
        disputant: Address,
        _proof: Vec<u8>,
    ) -> Result<(), GatewayRejection> {
        self.check_refusal()?;
        self.disputes.write().push((channel_id, disputant));
        Ok(())
    }

    fn deactivate_channel(&self, channel_id: ChannelId) -> Result<(), GatewayRejection> {
        self.check_refusal()?;
        self.deactivated.write().push(channel_id);
        Ok(())
    }
}
