//! Units and their accounts.

use crate::types::Balance;
use parking_lot::{Mutex, MutexGuard};
use std::collections::{BTreeMap, HashMap};

/// A single named balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    balance: Balance,
}

impl Account {
    /// Creates an account with an initial balance.
    #[must_use]
    pub const fn new(balance: Balance) -> Self {
        Self { balance }
    }

    /// Returns the current balance.
    #[must_use]
    pub const fn balance(&self) -> Balance {
        self.balance
    }

    pub(crate) fn set_balance(&mut self, balance: Balance) {
        self.balance = balance;
    }
}

/// Accounts of one unit, keyed by account name.
pub(crate) type Accounts = HashMap<String, Account>;

/// A logical entity owning a set of named accounts.
///
/// Units are created by the ledger and shared as `Arc<Unit>`. Balances can
/// be read at any time; they change only through a committed transaction or
/// a snapshot load.
#[derive(Debug, Default)]
pub struct Unit {
    accounts: Mutex<Accounts>,
}

impl Unit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the balance of an account, if it exists.
    #[must_use]
    pub fn balance(&self, key: &str) -> Option<Balance> {
        self.accounts.lock().get(key).map(Account::balance)
    }

    /// Returns a copy of an account, if it exists.
    #[must_use]
    pub fn account(&self, key: &str) -> Option<Account> {
        self.accounts.lock().get(key).copied()
    }

    /// Returns the number of accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }

    /// Returns true if the unit has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.lock().is_empty()
    }

    /// Returns every account key, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.accounts.lock().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Returns a consistent copy of every balance.
    #[must_use]
    pub fn total(&self) -> BTreeMap<String, Balance> {
        self.accounts
            .lock()
            .iter()
            .map(|(key, account)| (key.clone(), account.balance()))
            .collect()
    }

    /// Returns the sum of every balance, or `None` on overflow.
    #[must_use]
    pub fn sum(&self) -> Option<Balance> {
        self.accounts
            .lock()
            .values()
            .try_fold(0, |acc: Balance, account| acc.checked_add(account.balance()))
    }

    /// Removes every account and returns the removed keys.
    pub(crate) fn clear(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.accounts.lock().drain().map(|(key, _)| key).collect();
        keys.sort_unstable();
        keys
    }

    /// Replaces the account with the given balance, creating it if needed.
    pub(crate) fn replace(&self, key: &str, balance: Balance) {
        self.accounts
            .lock()
            .insert(key.to_owned(), Account::new(balance));
    }

    /// Locks the accounts for a commit.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Accounts> {
        self.accounts.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_unit_is_empty() {
        let unit = Unit::new();
        assert!(unit.is_empty());
        assert_eq!(unit.account_count(), 0);
        assert_eq!(unit.balance("cash"), None);
    }

    #[test]
    fn replace_overwrites_balance() {
        let unit = Unit::new();
        unit.replace("cash", 10);
        unit.replace("cash", 25);

        assert_eq!(unit.balance("cash"), Some(25));
        assert_eq!(unit.account("cash"), Some(Account::new(25)));
        assert_eq!(unit.account_count(), 1);
    }

    #[test]
    fn clear_returns_removed_keys() {
        let unit = Unit::new();
        unit.replace("b", 1);
        unit.replace("a", 2);

        assert_eq!(unit.clear(), vec!["a".to_string(), "b".to_string()]);
        assert!(unit.is_empty());
        assert!(unit.clear().is_empty());
    }

    #[test]
    fn total_copies_balances() {
        let unit = Unit::new();
        unit.replace("a", 100);
        unit.replace("b", 50);

        let total = unit.total();
        assert_eq!(total.len(), 2);
        assert_eq!(total["a"], 100);
        assert_eq!(total["b"], 50);
        assert_eq!(unit.sum(), Some(150));
    }

    #[test]
    fn sum_detects_overflow() {
        let unit = Unit::new();
        unit.replace("a", Balance::MAX);
        unit.replace("b", 1);
        assert_eq!(unit.sum(), None);
    }

    #[test]
    fn keys_are_sorted() {
        let unit = Unit::new();
        unit.replace("zeta", 0);
        unit.replace("alpha", 0);
        assert_eq!(unit.keys(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
