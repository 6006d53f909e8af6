//! Value objects for the consensus engine.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a consensus round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    /// Allocated, not yet started.
    Pending,
    /// Started; waiting for the proposer's state root.
    Active,
    /// Proposal received; votes are being collected.
    Voting,
    /// Threshold met; the root is being committed.
    Finalizing,
    /// Finalized successfully.
    Completed,
    /// Deadline passed without reaching the threshold.
    Failed,
}

impl RoundState {
    /// Whether a transition from this state to `target` is permitted.
    pub fn can_transition_to(&self, target: &RoundState) -> bool {
        use RoundState::*;
        matches!(
            (self, target),
            (Pending, Active)
                | (Active, Voting)
                | (Active, Failed)
                | (Voting, Finalizing)
                | (Voting, Failed)
                | (Finalizing, Completed)
        )
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundState::Completed | RoundState::Failed)
    }

    /// Whether a round in this state blocks a new round on its shard.
    pub fn is_open(&self) -> bool {
        matches!(self, RoundState::Active | RoundState::Voting)
    }
}
