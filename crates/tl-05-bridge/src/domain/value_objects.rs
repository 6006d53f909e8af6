//! Value objects for the channel bridge.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{ChannelId, Hash, Signature};

/// Status of a channel's dispute, when one has been opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// Open; resolution becomes possible once the window elapses.
    Initiated,
    /// Settled by validator supermajority. A new dispute may be opened.
    Resolved,
}

/// A countersigned balance-snapshot update submitted to the bridge.
///
/// Carries one signature per channel participant over the canonical update
/// digest. The sequence number orders updates; the bridge accepts only
/// strictly increasing sequences.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Channel the update belongs to.
    pub channel_id: ChannelId,
    /// Agreed state hash.
    pub state_hash: Hash,
    /// Update sequence number.
    pub sequence: u64,
    /// Compact signatures, one per participant, in any order.
    #[serde_as(as = "Vec<serde_with::Bytes>")]
    pub signatures: Vec<Signature>,
}
