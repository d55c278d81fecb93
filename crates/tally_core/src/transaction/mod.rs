//! Atomic multi-account transactions.
//!
//! A transaction queues balance operations without touching the ledger.
//! `commit` validates the whole batch against current balances and applies
//! all of it or none of it.

mod operation;
mod state;

pub use operation::{Operation, OperationKind};
pub use state::{Transaction, TransactionState};
