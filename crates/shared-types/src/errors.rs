//! # Error Taxonomy
//!
//! Every subsystem defines its own error enum; each variant maps onto one of
//! the six kinds below so callers can branch on the class of failure without
//! matching subsystem-specific variants.
//!
//! All failures are synchronous and leave state unchanged. None are fatal to
//! the system: a failed round restarts under a new id, a failed batch is
//! resubmitted, an expired HTLC becomes refundable.

use serde::{Deserialize, Serialize};

/// Classification of a rejected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed input: wrong signature count, oversize batch or payload.
    Validation,
    /// Caller lacks the required capability or participant membership.
    Authorization,
    /// Operation invalid for the entity's current status.
    StateConflict,
    /// Timestamp or ordering precondition unmet, such as a stale sequence
    /// number or an update inside a cooldown.
    Staleness,
    /// A deadline passed: message TTL, HTLC timelock, round end time.
    Expiry,
    /// A configured cap was hit: capacity, validator count, batch size,
    /// HTLC count.
    ResourceExhaustion,
}

impl ErrorKind {
    /// Whether retrying the same call later can possibly succeed without the
    /// caller changing its input. Authorization and validation failures need
    /// a different call; the rest depend on state or time that moves on.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ErrorKind::Validation | ErrorKind::Authorization => false,
            ErrorKind::StateConflict
            | ErrorKind::Staleness
            | ErrorKind::Expiry
            | ErrorKind::ResourceExhaustion => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability_split() {
        assert!(!ErrorKind::Validation.is_recoverable());
        assert!(!ErrorKind::Authorization.is_recoverable());
        assert!(ErrorKind::StateConflict.is_recoverable());
        assert!(ErrorKind::Staleness.is_recoverable());
        assert!(ErrorKind::Expiry.is_recoverable());
        assert!(ErrorKind::ResourceExhaustion.is_recoverable());
    }
}
