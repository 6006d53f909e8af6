//! Inbound port: the API this crate offers to the rest of the node.

use shared_types::{Address, Amount, ChannelId, Hash, Signature};

use crate::domain::entities::BridgeChannel;
use crate::domain::errors::BridgeResult;
use crate::domain::value_objects::StateUpdate;

/// Bridge operations exposed to the runtime and to the channel ledger.
///
/// The bridge is the on-ledger anchor for off-chain payment channels: it
/// tracks the latest countersigned state hash per channel, escrows locked
/// collateral, and arbitrates disputes with validator signatures. All methods
/// are synchronous; writes serialize behind a single lock.
pub trait ChannelBridgeApi: Send + Sync {
    /// Anchors a channel on the bridge. The id is derived from the
    /// participant set, the capacity, and the opening timestamp, so the
    /// ledger that opened the channel computes the same id.
    fn register_channel(
        &self,
        participants: Vec<Address>,
        capacity: Amount,
        opened_at: u64,
    ) -> BridgeResult<ChannelId>;

    /// Records a countersigned off-chain state. Every participant must have
    /// signed the update digest and the sequence must advance.
    fn update_channel_state(&self, update: StateUpdate) -> BridgeResult<()>;

    /// Opens a dispute on behalf of a participant. Freezes state updates for
    /// the configured dispute window.
    fn initiate_dispute(
        &self,
        channel_id: ChannelId,
        disputant: Address,
        proof: Vec<u8>,
    ) -> BridgeResult<()>;

    /// Closes an elapsed dispute with a validator-arbitrated final state.
    /// Requires supermajority validator signatures over the resolution
    /// digest.
    fn resolve_dispute(
        &self,
        channel_id: ChannelId,
        final_state_hash: Hash,
        validator_signatures: Vec<Signature>,
    ) -> BridgeResult<()>;

    /// Escrows collateral against the channel, up to its capacity.
    fn lock_funds(&self, channel_id: ChannelId, amount: Amount) -> BridgeResult<()>;

    /// Returns previously locked collateral.
    fn release_funds(&self, channel_id: ChannelId, amount: Amount) -> BridgeResult<()>;

    /// Retires a channel. Deactivated channels refuse every mutation.
    fn deactivate_channel(&self, channel_id: ChannelId) -> BridgeResult<()>;

    /// Snapshot of one channel.
    fn channel(&self, channel_id: &ChannelId) -> Option<BridgeChannel>;

    /// All channels ordered by id.
    fn channels(&self) -> Vec<BridgeChannel>;

    /// Number of registered channels.
    fn channel_count(&self) -> usize;
}
