//! Value objects for the validator registry.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidatorStatus {
    /// Registered with locked stake, not yet participating.
    Pending,
    /// Eligible for shard assignment, voting, and proposing.
    Active,
    /// Temporarily excluded; may return to Active once the term elapses.
    Jailed,
    /// Permanently removed after a protocol violation.
    Slashed,
}

impl ValidatorStatus {
    /// Whether a transition from this status to `target` is permitted.
    pub fn can_transition_to(&self, target: &ValidatorStatus) -> bool {
        use ValidatorStatus::*;
        matches!(
            (self, target),
            (Pending, Active) | (Active, Jailed) | (Active, Slashed) | (Jailed, Active)
        )
    }

    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ValidatorStatus::Slashed)
    }

    /// Whether a validator in this status may vote and propose.
    pub fn is_participating(&self) -> bool {
        matches!(self, ValidatorStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_activates() {
        assert!(ValidatorStatus::Pending.can_transition_to(&ValidatorStatus::Active));
        assert!(!ValidatorStatus::Pending.can_transition_to(&ValidatorStatus::Jailed));
        assert!(!ValidatorStatus::Pending.can_transition_to(&ValidatorStatus::Slashed));
    }

    #[test]
    fn test_active_can_be_punished() {
        assert!(ValidatorStatus::Active.can_transition_to(&ValidatorStatus::Jailed));
        assert!(ValidatorStatus::Active.can_transition_to(&ValidatorStatus::Slashed));
        assert!(!ValidatorStatus::Active.can_transition_to(&ValidatorStatus::Pending));
    }

    #[test]
    fn test_jailed_returns_to_active_only() {
        assert!(ValidatorStatus::Jailed.can_transition_to(&ValidatorStatus::Active));
        assert!(!ValidatorStatus::Jailed.can_transition_to(&ValidatorStatus::Slashed));
        assert!(!ValidatorStatus::Jailed.can_transition_to(&ValidatorStatus::Pending));
    }

    #[test]
    fn test_slashed_is_terminal() {
        assert!(ValidatorStatus::Slashed.is_terminal());
        assert!(!ValidatorStatus::Slashed.can_transition_to(&ValidatorStatus::Active));
        assert!(!ValidatorStatus::Slashed.can_transition_to(&ValidatorStatus::Pending));
    }

    #[test]
    fn test_only_active_participates() {
        assert!(ValidatorStatus::Active.is_participating());
        assert!(!ValidatorStatus::Pending.is_participating());
        assert!(!ValidatorStatus::Jailed.is_participating());
        assert!(!ValidatorStatus::Slashed.is_participating());
    }
}
