//! Registry invariants checked before any state is written.

use shared_types::{Amount, BasisPoints};

use super::errors::{ValidatorError, ValidatorResult};

/// Upper bound of the performance score range.
pub const MAX_PERFORMANCE_SCORE: u8 = 100;

/// Commission must not exceed the protocol cap.
pub fn invariant_commission_within_cap(
    commission_bps: BasisPoints,
    cap_bps: BasisPoints,
) -> ValidatorResult<()> {
    if commission_bps > cap_bps {
        return Err(ValidatorError::InvalidCommission {
            got: commission_bps,
            cap: cap_bps,
        });
    }
    Ok(())
}

/// Stake must meet the registration minimum.
pub fn invariant_stake_sufficient(stake: Amount, minimum: Amount) -> ValidatorResult<()> {
    if stake < minimum {
        return Err(ValidatorError::InsufficientStake {
            got: stake,
            minimum,
        });
    }
    Ok(())
}

/// Performance scores live in 0..=100.
pub fn invariant_score_in_range(score: u8) -> ValidatorResult<()> {
    if score > MAX_PERFORMANCE_SCORE {
        return Err(ValidatorError::InvalidScore { got: score });
    }
    Ok(())
}
