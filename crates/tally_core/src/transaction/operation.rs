//! Queued balance operations.

use crate::error::RejectReason;
use crate::types::{Balance, UnitId};
use std::fmt;

/// What an operation does to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Add a non-negative amount.
    Credit(Balance),
    /// Subtract a non-negative amount; the balance must stay non-negative.
    Debit(Balance),
    /// Replace the balance with a non-negative value.
    Set(Balance),
}

impl OperationKind {
    /// Computes the balance after this operation.
    pub fn apply(self, balance: Balance) -> Result<Balance, RejectReason> {
        match self {
            Self::Credit(amount) | Self::Debit(amount) | Self::Set(amount) if amount < 0 => {
                Err(RejectReason::NegativeAmount { amount })
            }
            Self::Credit(amount) => balance.checked_add(amount).ok_or(RejectReason::Overflow),
            Self::Debit(amount) if amount > balance => Err(RejectReason::InsufficientFunds {
                balance,
                requested: amount,
            }),
            Self::Debit(amount) => Ok(balance - amount),
            Self::Set(value) => Ok(value),
        }
    }
}

/// A balance operation queued in a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Target unit.
    pub unit: UnitId,
    /// Target account key.
    pub key: String,
    /// Effect on the balance.
    pub kind: OperationKind,
}

impl Operation {
    /// Creates an operation.
    pub fn new(unit: UnitId, key: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            unit,
            key: key.into(),
            kind,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unit, key) = (self.unit, &self.key);
        match self.kind {
            OperationKind::Credit(amount) => write!(f, "credit {amount} to {unit}/{key}"),
            OperationKind::Debit(amount) => write!(f, "debit {amount} from {unit}/{key}"),
            OperationKind::Set(value) => write!(f, "set {unit}/{key} to {value}"),
        }
    }
}
