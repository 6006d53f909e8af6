//! Bridge gateway backing the channel ledger.

use std::sync::Arc;

use shared_types::{Address, Amount, ChannelId};
use tl_05_bridge::{ChannelBridgeApi, ChannelBridgeService};
use tl_06_channels::{BridgeGateway, GatewayRejection};

/// [`BridgeGateway`] that drives the live channel bridge.
///
/// The ledger calls through this port before any local write, so a bridge
/// refusal surfaces as a [`GatewayRejection`] and the ledger operation
/// aborts cleanly.
pub struct BridgeChannelGateway {
    bridge: Arc<ChannelBridgeService>,
}

impl BridgeChannelGateway {
    /// Wraps a bridge handle.
    pub fn new(bridge: Arc<ChannelBridgeService>) -> Self {
        Self { bridge }
    }
}

impl BridgeGateway for BridgeChannelGateway {
    fn register_channel(
        &self,
        participants: &[Address],
        capacity: Amount,
        opened_at: u64,
    ) -> Result<ChannelId, GatewayRejection> {
        self.bridge
            .register_channel(participants.to_vec(), capacity, opened_at)
            .map_err(|e| GatewayRejection(e.to_string()))
    }

    fn submit_dispute(
        &self,
        channel_id: ChannelId,
        disputant: Address,
        proof: Vec<u8>,
    ) -> Result<(), GatewayRejection> {
        self.bridge
            .initiate_dispute(channel_id, disputant, proof)
            .map_err(|e| GatewayRejection(e.to_string()))
    }

    fn deactivate_channel(&self, channel_id: ChannelId) -> Result<(), GatewayRejection> {
        self.bridge
            .deactivate_channel(channel_id)
            .map_err(|e| GatewayRejection(e.to_string()))
    }
}
