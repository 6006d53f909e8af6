//! Round invariants and the threshold arithmetic.

use shared_types::Address;

/// Votes required to finalize: ceil(count * percent / 100), at least 1.
pub fn vote_threshold(validator_count: usize, approval_percent: u8) -> u32 {
    let scaled = validator_count as u64 * u64::from(approval_percent);
    (scaled.div_ceil(100)).max(1) as u32
}

/// Deterministic proposer: the sorted electorate indexed by round id.
/// Callers guarantee a non-empty, ascending-sorted slice.
pub fn select_proposer(sorted_electorate: &[Address], round_id: u64) -> Address {
    let index = (round_id % sorted_electorate.len() as u64) as usize;
    sorted_electorate[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_ceiling() {
        // 4 validators at 67 percent: ceil(2.68) = 3.
        assert_eq!(vote_threshold(4, 67), 3);
        // 3 validators at 67 percent: ceil(2.01) = 3.
        assert_eq!(vote_threshold(3, 67), 3);
        // 10 validators at 50 percent: exactly 5.
        assert_eq!(vote_threshold(10, 50), 5);
        assert_eq!(vote_threshold(100, 67), 67);
    }

    #[test]
    fn test_threshold_floor_is_one() {
        assert_eq!(vote_threshold(1, 1), 1);
        assert_eq!(vote_threshold(0, 67), 1);
    }

    #[test]
    fn test_proposer_rotates_with_round_id() {
        let set = vec![[1u8; 20], [2u8; 20], [3u8; 20]];
        assert_eq!(select_proposer(&set, 1), [2u8; 20]);
        assert_eq!(select_proposer(&set, 2), [3u8; 20]);
        assert_eq!(select_proposer(&set, 3), [1u8; 20]);
        assert_eq!(select_proposer(&set, 4), [2u8; 20]);
    }

    #[test]
    fn test_proposer_is_pure() {
        let set = vec![[5u8; 20], [9u8; 20]];
        assert_eq!(select_proposer(&set, 7), select_proposer(&set, 7));
    }
}
