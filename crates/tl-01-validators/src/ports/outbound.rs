//! Outbound ports: dependencies the registry needs from its host.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

use shared_types::{Address, Amount};

/// Errors surfaced by stake custody.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    /// The vault refused the operation.
    #[error("vault rejected: {0}")]
    Rejected(String),
}

/// Custody interface for validator stake.
///
/// The registry records amounts; actual balances live behind this port.
/// Every custody call happens before the registry commits its own state,
/// so a vault refusal aborts the operation with nothing written.
pub trait StakeVault: Send + Sync {
    /// Locks `amount` of the owner's funds as validator stake.
    fn lock_stake(&self, owner: &Address, amount: Amount) -> Result<(), VaultError>;

    /// Burns `amount` of locked stake following a slashing event.
    fn burn_stake(&self, owner: &Address, amount: Amount) -> Result<(), VaultError>;

    /// Releases `amount` of locked stake back to the owner.
    fn release_stake(&self, owner: &Address, amount: Amount) -> Result<(), VaultError>;
}

/// Stake vault backed by an in-process map. Used in tests and the
/// single-node runtime, where no external custody exists.
#[derive(Debug, Default)]
pub struct InMemoryStakeVault {
    locked: RwLock<HashMap<Address, Amount>>,
}

impl InMemoryStakeVault {
    /// Creates an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently locked stake for `owner`.
    pub fn locked_amount(&self, owner: &Address) -> Amount {
        self.locked.read().get(owner).copied().unwrap_or(0)
    }
}

impl StakeVault for InMemoryStakeVault {
    fn lock_stake(&self, owner: &Address, amount: Amount) -> Result<(), VaultError> {
        let mut locked = self.locked.write();
        let entry = locked.entry(*owner).or_insert(0);
        *entry = entry.saturating_add(amount);
        Ok(())
    }

    fn burn_stake(&self, owner: &Address, amount: Amount) -> Result<(), VaultError> {
        self.debit(owner, amount, "burn")
    }

    fn release_stake(&self, owner: &Address, amount: Amount) -> Result<(), VaultError> {
        self.debit(owner, amount, "release")
    }
}

impl InMemoryStakeVault {
    fn debit(&self, owner: &Address, amount: Amount, op: &str) -> Result<(), VaultError> {
        let mut locked = self.locked.write();
        let entry = locked
            .get_mut(owner)
            .ok_or_else(|| VaultError::Rejected(format!("no locked stake to {op}")))?;
        if *entry < amount {
            return Err(VaultError::Rejected(format!(
                "cannot {op} {amount}: only {entry} locked"
            )));
        }
        *entry -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_and_release() {
        let vault = InMemoryStakeVault::new();
        let owner = [1u8; 20];
        vault.lock_stake(&owner, 500).unwrap();
        assert_eq!(vault.locked_amount(&owner), 500);
        vault.release_stake(&owner, 200).unwrap();
        assert_eq!(vault.locked_amount(&owner), 300);
    }

    #[test]
    fn test_overdraw_rejected() {
        let vault = InMemoryStakeVault::new();
        let owner = [2u8; 20];
        vault.lock_stake(&owner, 100).unwrap();
        assert!(vault.burn_stake(&owner, 200).is_err());
        assert_eq!(vault.locked_amount(&owner), 100);
    }

    #[test]
    fn test_debit_unknown_owner_rejected() {
        let vault = InMemoryStakeVault::new();
        assert!(vault.release_stake(&[9u8; 20], 1).is_err());
    }
}
