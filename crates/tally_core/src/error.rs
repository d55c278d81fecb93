//! Error types for Tally core.

use crate::transaction::Operation;
use crate::types::{Balance, UnitId};
use std::io;
use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No unit with this id exists.
    #[error("unit not found: {unit}")]
    UnitNotFound {
        /// The id that was looked up.
        unit: UnitId,
    },

    /// A unit with this id already exists.
    #[error("unit already exists: {unit}")]
    UnitExists {
        /// The id that was being created.
        unit: UnitId,
    },

    /// The gate is closed; the operation was not admitted.
    #[error("ledger gate is closed")]
    GateUnavailable,

    /// The gate could not be closed and drained within its retry budget.
    #[error("ledger gate could not be closed and drained")]
    GateCloseFailed,

    /// The gate could not be reopened within its retry budget.
    #[error("ledger gate could not be reopened")]
    GateOpenFailed,

    /// The snapshot file could not be read.
    #[error("snapshot read failed: {0}")]
    SnapshotRead(#[source] io::Error),

    /// A snapshot record carried a non-numeric id or balance.
    #[error("snapshot parse failed at line {line}: invalid {field} {value:?}")]
    SnapshotParse {
        /// 1-based line number of the failing record.
        line: usize,
        /// Name of the offending field.
        field: &'static str,
        /// Raw field text.
        value: String,
    },

    /// The snapshot file could not be written.
    #[error("snapshot write failed: {0}")]
    SnapshotWrite(#[source] io::Error),

    /// The transaction was already committed or rolled back.
    #[error("transaction already finalized")]
    TransactionFinalized,

    /// A queued operation failed validation; nothing was applied.
    #[error("transaction rejected at operation {index} ({operation}): {reason}")]
    TransactionValidation {
        /// Position of the failing operation in the batch.
        index: usize,
        /// The failing operation.
        operation: Operation,
        /// Why it was rejected.
        reason: RejectReason,
    },

    /// The account key cannot be stored in a snapshot.
    #[error("invalid account key: {key:?}")]
    InvalidAccountKey {
        /// The rejected key.
        key: String,
    },
}

impl LedgerError {
    /// Creates a snapshot parse error.
    pub fn snapshot_parse(line: usize, field: &'static str, value: impl Into<String>) -> Self {
        Self::SnapshotParse {
            line,
            field,
            value: value.into(),
        }
    }

    /// Returns true if retrying later may succeed.
    ///
    /// Gate failures are transient: they clear once a snapshot finishes.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::GateUnavailable | Self::GateCloseFailed | Self::GateOpenFailed
        )
    }
}

/// Why a queued operation was rejected at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The operation targets a unit that does not exist.
    #[error("unit does not exist")]
    UnitNotFound,

    /// Credit and debit amounts, and set balances, must not be negative.
    #[error("negative amount {amount}")]
    NegativeAmount {
        /// The rejected amount.
        amount: Balance,
    },

    /// The debit would drive the balance below zero.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance at that point of the batch.
        balance: Balance,
        /// Amount the debit asked for.
        requested: Balance,
    },

    /// The credit would overflow the balance.
    #[error("balance overflow")]
    Overflow,
}
