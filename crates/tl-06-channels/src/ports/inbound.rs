//! Inbound port: the API this crate offers to the rest of the node.

use shared_types::{Address, Amount, ChannelId, Hash, HtlcId};

use crate::domain::entities::{Channel, Htlc};
use crate::domain::errors::ChannelResult;
use crate::domain::value_objects::Preimage;

/// Channel ledger operations exposed to the runtime.
///
/// The ledger owns balances and the HTLC lifecycle; the bridge anchors the
/// channel's agreed state and arbitrates disputes. All methods are
/// synchronous; writes serialize behind a single lock.
pub trait ChannelLedgerApi: Send + Sync {
    /// Opens a channel: registers it with the bridge, splits the funding
    /// evenly (remainder to the first participant), phase Opening. The
    /// funding must equal the capacity.
    fn open(
        &self,
        participants: Vec<Address>,
        capacity: Amount,
        funding: Amount,
    ) -> ChannelResult<ChannelId>;

    /// Confirms funding and moves the channel to Active. Participant only.
    fn confirm_open(&self, channel_id: ChannelId, caller: Address) -> ChannelResult<()>;

    /// Creates an HTLC: debits the sender into the locked pool. Active
    /// channels only; sender and recipient must be distinct participants;
    /// the timelock must lie in the future.
    fn create_htlc(
        &self,
        channel_id: ChannelId,
        sender: Address,
        recipient: Address,
        amount: Amount,
        hash_lock: Hash,
        timelock: u64,
    ) -> ChannelResult<HtlcId>;

    /// Resolves a pending HTLC with its preimage before the timelock:
    /// credits the recipient and stores the revealed preimage.
    fn resolve_htlc(&self, htlc_id: HtlcId, preimage: Preimage) -> ChannelResult<()>;

    /// Refunds a pending HTLC to its sender once the timelock lapses.
    /// Sender only; nothing refunds automatically.
    fn refund_htlc(&self, htlc_id: HtlcId, caller: Address) -> ChannelResult<()>;

    /// Proposes a cooperative close with a closing state hash. Active
    /// channels only; the initiator's confirmation is recorded immediately.
    fn initiate_close(
        &self,
        channel_id: ChannelId,
        caller: Address,
        state_hash: Hash,
    ) -> ChannelResult<()>;

    /// Confirms a proposed close, once per participant. The final
    /// confirmation distributes balances, deactivates the bridge record,
    /// and closes the channel; it is refused while HTLCs are pending.
    fn confirm_close(&self, channel_id: ChannelId, caller: Address) -> ChannelResult<()>;

    /// Escalates to the bridge and marks the channel Disputed. Participant
    /// only, from Active or Closing.
    fn raise_dispute(
        &self,
        channel_id: ChannelId,
        caller: Address,
        proof: Vec<u8>,
    ) -> ChannelResult<()>;

    /// Applies a bridge-arbitrated final state: Disputed back to Closing
    /// with the arbitrated hash, a fresh settle deadline, and confirmations
    /// reset.
    fn apply_resolution(&self, channel_id: ChannelId, final_state_hash: Hash)
        -> ChannelResult<()>;

    /// Snapshot of one channel.
    fn channel(&self, channel_id: &ChannelId) -> Option<Channel>;

    /// All channels ordered by id.
    fn channels(&self) -> Vec<Channel>;

    /// Snapshot of one HTLC.
    fn htlc(&self, htlc_id: &HtlcId) -> Option<Htlc>;

    /// All HTLCs belonging to a channel, ordered by id.
    fn channel_htlcs(&self, channel_id: &ChannelId) -> Vec<Htlc>;

    /// Number of channels in the ledger, closed ones included.
    fn channel_count(&self) -> usize;
}
