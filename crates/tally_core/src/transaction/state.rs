//! Transaction state and commit.

use crate::error::{LedgerError, LedgerResult, RejectReason};
use crate::ledger::Ledger;
use crate::transaction::operation::{Operation, OperationKind};
use crate::types::{is_valid_account_key, Balance, UnitId};
use crate::unit::{Account, Unit};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting operations.
    Open,
    /// Committed; every operation was applied.
    Committed,
    /// Rolled back; no operation was applied.
    RolledBack,
}

/// A batch of balance operations bound to a ledger.
///
/// Operations are only recorded until [`Transaction::commit`], which
/// validates the whole batch and applies all of it or none of it. Once
/// committed or rolled back the transaction rejects further use with
/// [`LedgerError::TransactionFinalized`].
///
/// Dropping an open transaction discards its operations.
#[derive(Debug)]
pub struct Transaction<'a> {
    ledger: &'a Ledger,
    state: TransactionState,
    operations: Vec<Operation>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(ledger: &'a Ledger) -> Self {
        ledger.stats().record_transaction_start();
        Self {
            ledger,
            state: TransactionState::Open,
            operations: Vec::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction still accepts operations.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == TransactionState::Open
    }

    /// Returns the queued operations in order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Queues a credit of `amount` to an account.
    pub fn credit(&mut self, unit: UnitId, key: &str, amount: Balance) -> LedgerResult<&mut Self> {
        self.push(unit, key, OperationKind::Credit(amount))
    }

    /// Queues a debit of `amount` from an account.
    pub fn debit(&mut self, unit: UnitId, key: &str, amount: Balance) -> LedgerResult<&mut Self> {
        self.push(unit, key, OperationKind::Debit(amount))
    }

    /// Queues an absolute balance for an account.
    pub fn set(&mut self, unit: UnitId, key: &str, balance: Balance) -> LedgerResult<&mut Self> {
        self.push(unit, key, OperationKind::Set(balance))
    }

    fn push(&mut self, unit: UnitId, key: &str, kind: OperationKind) -> LedgerResult<&mut Self> {
        self.ensure_open()?;
        if !is_valid_account_key(key) {
            return Err(LedgerError::InvalidAccountKey {
                key: key.to_owned(),
            });
        }
        self.operations.push(Operation::new(unit, key, kind));
        Ok(self)
    }

    /// Validates and applies every queued operation.
    ///
    /// # Errors
    ///
    /// - `GateUnavailable` if the ledger gate is closed. The transaction stays
    ///   open and can be committed again later.
    /// - `TransactionValidation` naming the first failing operation. Nothing
    ///   is applied and the transaction is rolled back.
    /// - `TransactionFinalized` if already committed or rolled back.
    pub fn commit(&mut self) -> LedgerResult<()> {
        self.ensure_open()?;
        let _guard = self.ledger.admit("commit", None)?;

        match apply_batch(self.ledger, &self.operations) {
            Ok(()) => {
                self.state = TransactionState::Committed;
                self.ledger.stats().record_transaction_commit();
                tracing::debug!(operations = self.operations.len(), "transaction committed");
                Ok(())
            }
            Err((index, reason)) => {
                let operation = self.operations.swap_remove(index);
                self.operations.clear();
                self.state = TransactionState::RolledBack;
                self.ledger.stats().record_transaction_reject();
                self.ledger.stats().record_transaction_rollback();
                self.ledger.report(
                    format!("transaction rejected: {operation}: {reason}"),
                    Some(operation.unit),
                    "commit",
                );
                Err(LedgerError::TransactionValidation {
                    index,
                    operation,
                    reason,
                })
            }
        }
    }

    /// Discards every queued operation.
    pub fn rollback(&mut self) -> LedgerResult<()> {
        self.ensure_open()?;
        self.operations.clear();
        self.state = TransactionState::RolledBack;
        self.ledger.stats().record_transaction_rollback();
        Ok(())
    }

    fn ensure_open(&self) -> LedgerResult<()> {
        match self.state {
            TransactionState::Open => Ok(()),
            TransactionState::Committed | TransactionState::RolledBack => {
                Err(LedgerError::TransactionFinalized)
            }
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.is_open() {
            self.ledger.stats().record_transaction_rollback();
            if !self.operations.is_empty() {
                tracing::debug!(
                    operations = self.operations.len(),
                    "open transaction dropped; operations discarded"
                );
            }
        }
    }
}

/// Validates `operations` in order and applies them if all pass.
///
/// Units are locked in ascending id order, so concurrent commits cannot
/// deadlock and two commits touching the same unit serialize. On failure the
/// index of the first failing operation is returned and nothing is written.
fn apply_batch(ledger: &Ledger, operations: &[Operation]) -> Result<(), (usize, RejectReason)> {
    let units: BTreeMap<UnitId, Arc<Unit>> = operations
        .iter()
        .filter_map(|op| ledger.lookup(op.unit).map(|unit| (op.unit, unit)))
        .collect();
    let mut locked: BTreeMap<UnitId, _> = units.iter().map(|(id, unit)| (*id, unit.lock())).collect();

    let mut staged: HashMap<(UnitId, &str), Balance> = HashMap::new();
    for (index, op) in operations.iter().enumerate() {
        let Some(accounts) = locked.get(&op.unit) else {
            return Err((index, RejectReason::UnitNotFound));
        };
        let slot = (op.unit, op.key.as_str());
        let current = match staged.get(&slot) {
            Some(balance) => *balance,
            None => accounts.get(&op.key).map_or(0, Account::balance),
        };
        let next = op.kind.apply(current).map_err(|reason| (index, reason))?;
        staged.insert(slot, next);
    }

    for ((unit, key), balance) in staged {
        if let Some(accounts) = locked.get_mut(&unit) {
            accounts
                .entry(key.to_owned())
                .or_insert(Account::new(0))
                .set_balance(balance);
        }
    }
    Ok(())
}
