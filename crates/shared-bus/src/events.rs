//! # Ledger Events
//!
//! Defines every event record the subsystems emit. Status-change variants
//! carry the old and new values so observers can reconstruct history from the
//! journal alone.
//!
//! Statuses are carried as their `Debug` rendering rather than as the
//! subsystem's own enum, keeping this crate free of dependencies on the
//! subsystem crates.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, ChannelId, Hash, HtlcId, MessageId, RoundId, ShardId};
use uuid::Uuid;

/// A journaled event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Correlation id, unique per record.
    pub id: Uuid,
    /// Position in the journal's total order, starting at 0.
    pub sequence: u64,
    /// Unix timestamp at which the record was appended.
    pub timestamp: u64,
    /// The event itself.
    pub event: LedgerEvent,
}

/// All events that can be journaled and broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // SUBSYSTEM 1: VALIDATOR REGISTRY
    // =========================================================================
    /// A validator registered and locked its minimum stake.
    ValidatorRegistered {
        /// Validator identity.
        identity: Address,
        /// Locked stake.
        stake: Amount,
        /// Commission rate in basis points.
        commission_bps: u16,
    },

    /// A validator's status changed (activation, jailing, slashing, release).
    ValidatorStatusChanged {
        /// Validator identity.
        identity: Address,
        /// Status before the change.
        old_status: String,
        /// Status after the change.
        new_status: String,
    },

    /// A validator was assigned to a shard.
    ValidatorAssigned {
        /// Validator identity.
        identity: Address,
        /// Target shard.
        shard_id: ShardId,
    },

    /// A per-shard performance score was updated.
    PerformanceUpdated {
        /// Validator identity.
        identity: Address,
        /// Shard the score applies to.
        shard_id: ShardId,
        /// Score before the update.
        old_score: u8,
        /// Score after the update.
        new_score: u8,
    },

    /// Stake was deducted from a slashed validator.
    ValidatorSlashed {
        /// Validator identity.
        identity: Address,
        /// Deducted amount.
        penalty: Amount,
        /// Stake remaining after the deduction.
        remaining_stake: Amount,
        /// Slashing reason supplied by the caller.
        reason: String,
    },

    /// A validator was jailed until the given time.
    ValidatorJailed {
        /// Validator identity.
        identity: Address,
        /// Unix time at which release becomes possible.
        jailed_until: u64,
    },

    /// Reward units were accrued (proposer bonus or voter base reward).
    RewardAccrued {
        /// Validator identity.
        identity: Address,
        /// Units accrued by this event.
        amount: Amount,
        /// Lifetime accrued total.
        total: Amount,
    },

    /// Remaining stake was handed back through the stake vault.
    StakeWithdrawn {
        /// Validator identity.
        identity: Address,
        /// Withdrawn amount.
        amount: Amount,
    },

    // =========================================================================
    // SUBSYSTEM 2: CONSENSUS ENGINE
    // =========================================================================
    /// A consensus round was started for a shard.
    RoundStarted {
        /// Shard the round belongs to.
        shard_id: ShardId,
        /// Round identifier, monotonic per shard.
        round_id: RoundId,
        /// Deterministically selected proposer.
        proposer: Address,
        /// Unix time at which the round expires.
        end_time: u64,
    },

    /// The proposer submitted a state root; voting opened.
    StateProposed {
        /// Shard the round belongs to.
        shard_id: ShardId,
        /// Round identifier.
        round_id: RoundId,
        /// Proposed state root.
        state_root: Hash,
    },

    /// A validator cast a vote.
    VoteCast {
        /// Shard the round belongs to.
        shard_id: ShardId,
        /// Round identifier.
        round_id: RoundId,
        /// Voting validator.
        validator: Address,
        /// Whether the vote supports the proposal.
        support: bool,
        /// Supporting votes accumulated so far.
        votes_for: u32,
    },

    /// A round reached its vote threshold and finalized.
    RoundFinalized {
        /// Shard the round belongs to.
        shard_id: ShardId,
        /// Round identifier.
        round_id: RoundId,
        /// Finalized state root.
        state_root: Hash,
        /// Supporting votes at finalization.
        votes_for: u32,
        /// Votes that were required.
        required: u32,
    },

    /// A round's end time passed without reaching the threshold.
    RoundFailed {
        /// Shard the round belongs to.
        shard_id: ShardId,
        /// Round identifier.
        round_id: RoundId,
        /// Supporting votes at expiry.
        votes_for: u32,
        /// Votes that were required.
        required: u32,
    },

    // =========================================================================
    // SUBSYSTEM 3: SHARD REGISTRY
    // =========================================================================
    /// A shard was created.
    ShardCreated {
        /// Assigned sequential id.
        shard_id: ShardId,
        /// Load capacity.
        capacity: u64,
        /// Number of validators in the initial set.
        validator_count: usize,
    },

    /// A shard's status changed.
    ShardStatusChanged {
        /// Shard id.
        shard_id: ShardId,
        /// Status before the change.
        old_status: String,
        /// Status after the change.
        new_status: String,
    },

    /// A shard's load figure was updated.
    ShardLoadUpdated {
        /// Shard id.
        shard_id: ShardId,
        /// Load before the update.
        old_load: u64,
        /// Load after the update.
        new_load: u64,
        /// Capacity, for ratio reconstruction.
        capacity: u64,
    },

    /// Load crossed the rebalance threshold and a target search ran.
    RebalanceTriggered {
        /// Overloaded shard.
        shard_id: ShardId,
        /// Load at the trigger.
        load: u64,
        /// Capacity at the trigger.
        capacity: u64,
        /// Chosen target, if any shard had spare capacity.
        target: Option<ShardId>,
    },

    /// A shard's finalized state root advanced.
    ShardRootUpdated {
        /// Shard id.
        shard_id: ShardId,
        /// Previous root, absent for the first update.
        old_root: Option<Hash>,
        /// New root.
        new_root: Hash,
    },

    // =========================================================================
    // SUBSYSTEM 4: ROUTING FABRIC
    // =========================================================================
    /// A directional route between two shards was established.
    RouteEstablished {
        /// Source shard.
        source: ShardId,
        /// Target shard.
        target: ShardId,
        /// Message capacity.
        capacity: u64,
        /// Latency estimate in milliseconds.
        latency_ms: u64,
    },

    /// A route's status changed (congestion, maintenance, failure, clearing).
    RouteStatusChanged {
        /// Source shard.
        source: ShardId,
        /// Target shard.
        target: ShardId,
        /// Status before the change.
        old_status: String,
        /// Status after the change.
        new_status: String,
    },

    /// A message was accepted onto a route.
    MessageSent {
        /// Content-derived message id.
        message_id: MessageId,
        /// Source shard.
        source: ShardId,
        /// Target shard.
        target: ShardId,
        /// Sending actor.
        sender: Address,
        /// Unix time past which the message can no longer deliver.
        expires_at: u64,
    },

    /// A message reached a terminal or acknowledged status.
    MessageStatusChanged {
        /// Message id.
        message_id: MessageId,
        /// Status before the change.
        old_status: String,
        /// Status after the change.
        new_status: String,
    },

    /// A batch was assembled.
    BatchCreated {
        /// Batch id.
        batch_id: Uuid,
        /// Source shard.
        source: ShardId,
        /// Target shard.
        target: ShardId,
        /// Number of messages in the batch.
        message_count: usize,
    },

    /// Every message in a batch was delivered.
    BatchCompleted {
        /// Batch id.
        batch_id: Uuid,
        /// Messages delivered.
        delivered: usize,
    },

    /// A batch aborted at its first failing message.
    BatchFailed {
        /// Batch id.
        batch_id: Uuid,
        /// The message that failed.
        failed_message: MessageId,
        /// Messages already delivered before the failure.
        delivered_before_failure: usize,
    },

    // =========================================================================
    // SUBSYSTEM 5: CHANNEL BRIDGE
    // =========================================================================
    /// A channel was registered with the bridge.
    BridgeChannelRegistered {
        /// Content-derived channel id.
        channel_id: ChannelId,
        /// Ordered participant list.
        participants: Vec<Address>,
        /// Channel capacity.
        capacity: Amount,
    },

    /// A countersigned state update was accepted.
    ChannelStateUpdated {
        /// Channel id.
        channel_id: ChannelId,
        /// Agreed state hash.
        state_hash: Hash,
        /// Update sequence number.
        sequence: u64,
    },

    /// A participant opened a dispute.
    DisputeInitiated {
        /// Channel id.
        channel_id: ChannelId,
        /// Disputing participant.
        disputant: Address,
        /// Unix time at which resolution becomes possible.
        window_ends_at: u64,
    },

    /// A dispute was resolved by validator supermajority.
    DisputeResolved {
        /// Channel id.
        channel_id: ChannelId,
        /// Arbitrated final state hash.
        final_state_hash: Hash,
        /// Distinct validator signatures accepted.
        signer_count: usize,
    },

    /// Funds were locked against a channel.
    FundsLocked {
        /// Channel id.
        channel_id: ChannelId,
        /// Locked amount.
        amount: Amount,
        /// Locked total after the operation.
        total_locked: Amount,
    },

    /// Locked funds were released.
    FundsReleased {
        /// Channel id.
        channel_id: ChannelId,
        /// Released amount.
        amount: Amount,
        /// Locked total after the operation.
        total_locked: Amount,
    },

    /// A bridge channel record was deactivated after the ledger closed it.
    BridgeChannelDeactivated {
        /// Channel id.
        channel_id: ChannelId,
    },

    // =========================================================================
    // SUBSYSTEM 6: CHANNEL LEDGER
    // =========================================================================
    /// A channel opened with an even initial split.
    ChannelOpened {
        /// Channel id.
        channel_id: ChannelId,
        /// Ordered participant list.
        participants: Vec<Address>,
        /// Capacity, equal to the funding.
        capacity: Amount,
    },

    /// A channel's phase changed (activation, closing, dispute, closed).
    ChannelPhaseChanged {
        /// Channel id.
        channel_id: ChannelId,
        /// Phase before the change.
        old_phase: String,
        /// Phase after the change.
        new_phase: String,
    },

    /// An HTLC was created; the sender's balance moved into the locked total.
    HtlcCreated {
        /// Content-derived HTLC id.
        htlc_id: HtlcId,
        /// Owning channel.
        channel_id: ChannelId,
        /// Paying participant.
        sender: Address,
        /// Receiving participant.
        recipient: Address,
        /// Locked amount.
        amount: Amount,
        /// Unix timelock.
        timelock: u64,
    },

    /// An HTLC resolved with a correct preimage; the recipient was credited.
    HtlcResolved {
        /// HTLC id.
        htlc_id: HtlcId,
        /// Owning channel.
        channel_id: ChannelId,
        /// Credited participant.
        recipient: Address,
        /// Credited amount.
        amount: Amount,
    },

    /// An expired HTLC was refunded to its sender.
    HtlcRefunded {
        /// HTLC id.
        htlc_id: HtlcId,
        /// Owning channel.
        channel_id: ChannelId,
        /// Refunded participant.
        sender: Address,
        /// Refunded amount.
        amount: Amount,
    },

    /// A cooperative close was proposed.
    CloseInitiated {
        /// Channel id.
        channel_id: ChannelId,
        /// Proposing participant.
        initiator: Address,
        /// Proposed closing state hash.
        state_hash: Hash,
        /// Unix deadline for confirmations.
        settle_deadline: u64,
    },

    /// A participant confirmed a cooperative close.
    CloseConfirmed {
        /// Channel id.
        channel_id: ChannelId,
        /// Confirming participant.
        participant: Address,
        /// Confirmations collected so far.
        confirmations: usize,
        /// Confirmations required (the participant count).
        required: usize,
    },

    /// All participants confirmed; funds distributed per final balances.
    ChannelClosed {
        /// Channel id.
        channel_id: ChannelId,
        /// Final per-participant balances.
        final_balances: Vec<(Address, Amount)>,
    },

    /// Bridge arbitration pushed a final state back into the ledger.
    ResolutionApplied {
        /// Channel id.
        channel_id: ChannelId,
        /// Arbitrated state hash.
        final_state_hash: Hash,
    },
}

impl LedgerEvent {
    /// The topic this event belongs to, for subscription filtering.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        use LedgerEvent::*;
        match self {
            ValidatorRegistered { .. }
            | ValidatorStatusChanged { .. }
            | ValidatorAssigned { .. }
            | PerformanceUpdated { .. }
            | ValidatorSlashed { .. }
            | ValidatorJailed { .. }
            | RewardAccrued { .. }
            | StakeWithdrawn { .. } => EventTopic::Validators,

            RoundStarted { .. }
            | StateProposed { .. }
            | VoteCast { .. }
            | RoundFinalized { .. }
            | RoundFailed { .. } => EventTopic::Consensus,

            ShardCreated { .. }
            | ShardStatusChanged { .. }
            | ShardLoadUpdated { .. }
            | RebalanceTriggered { .. }
            | ShardRootUpdated { .. } => EventTopic::Shards,

            RouteEstablished { .. }
            | RouteStatusChanged { .. }
            | MessageSent { .. }
            | MessageStatusChanged { .. }
            | BatchCreated { .. }
            | BatchCompleted { .. }
            | BatchFailed { .. } => EventTopic::Routing,

            BridgeChannelRegistered { .. }
            | ChannelStateUpdated { .. }
            | DisputeInitiated { .. }
            | DisputeResolved { .. }
            | FundsLocked { .. }
            | FundsReleased { .. }
            | BridgeChannelDeactivated { .. } => EventTopic::Bridge,

            ChannelOpened { .. }
            | ChannelPhaseChanged { .. }
            | HtlcCreated { .. }
            | HtlcResolved { .. }
            | HtlcRefunded { .. }
            | CloseInitiated { .. }
            | CloseConfirmed { .. }
            | ChannelClosed { .. }
            | ResolutionApplied { .. } => EventTopic::Channels,
        }
    }

    /// The emitting subsystem's log tag.
    #[must_use]
    pub fn subsystem_tag(&self) -> &'static str {
        match self.topic() {
            EventTopic::Validators => "tl-01",
            EventTopic::Consensus => "tl-02",
            EventTopic::Shards => "tl-03",
            EventTopic::Routing => "tl-04",
            EventTopic::Bridge => "tl-05",
            EventTopic::Channels => "tl-06",
        }
    }
}

/// Topics for event subscription, one per subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 1 events.
    Validators,
    /// Subsystem 2 events.
    Consensus,
    /// Subsystem 3 events.
    Shards,
    /// Subsystem 4 events.
    Routing,
    /// Subsystem 5 events.
    Bridge,
    /// Subsystem 6 events.
    Channels,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an envelope matches this filter.
    #[must_use]
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        self.topics.is_empty() || self.topics.contains(&envelope.event.topic())
    }
}
