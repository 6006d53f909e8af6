//! Registry invariants checked before any state is written.

use shared_types::Address;

use super::errors::{ShardError, ShardResult};

/// Capacity must be positive.
pub fn invariant_nonzero_capacity(capacity: u64) -> ShardResult<()> {
    if capacity == 0 {
        return Err(ShardError::ZeroCapacity);
    }
    Ok(())
}

/// The initial validator set must meet the minimum and hold no duplicates.
pub fn invariant_validator_set(validators: &[Address], minimum: usize) -> ShardResult<()> {
    if validators.len() < minimum {
        return Err(ShardError::InsufficientValidators {
            got: validators.len(),
            required: minimum,
        });
    }
    for (i, v) in validators.iter().enumerate() {
        if validators[..i].contains(v) {
            return Err(ShardError::DuplicateValidator);
        }
    }
    Ok(())
}

/// Load never exceeds capacity.
pub fn invariant_load_within_capacity(load: u64, capacity: u64) -> ShardResult<()> {
    if load > capacity {
        return Err(ShardError::CapacityExceeded { load, capacity });
    }
    Ok(())
}

/// Whether `load` against `capacity` is at or above `threshold_percent`.
pub fn crosses_threshold(load: u64, capacity: u64, threshold_percent: u8) -> bool {
    u128::from(load) * 100 >= u128::from(capacity) * u128::from(threshold_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_check() {
        assert!(invariant_nonzero_capacity(1).is_ok());
        assert!(invariant_nonzero_capacity(0).is_err());
    }

    #[test]
    fn test_validator_set_checks() {
        let a = [1u8; 20];
        let b = [2u8; 20];
        assert!(invariant_validator_set(&[a, b], 2).is_ok());
        assert_eq!(
            invariant_validator_set(&[a], 2),
            Err(ShardError::InsufficientValidators { got: 1, required: 2 })
        );
        assert_eq!(
            invariant_validator_set(&[a, b, a], 2),
            Err(ShardError::DuplicateValidator)
        );
    }

    #[test]
    fn test_load_bound() {
        assert!(invariant_load_within_capacity(1000, 1000).is_ok());
        assert!(invariant_load_within_capacity(1001, 1000).is_err());
    }

    #[test]
    fn test_threshold_arithmetic() {
        // 950/1000 against 75 percent.
        assert!(crosses_threshold(950, 1000, 75));
        assert!(crosses_threshold(750, 1000, 75));
        assert!(!crosses_threshold(749, 1000, 75));
        // No overflow near the top of the range.
        assert!(crosses_threshold(u64::MAX, u64::MAX, 100));
    }
}
