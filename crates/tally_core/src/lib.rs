//! # Tally Core
//!
//! In-memory transactional ledger.
//!
//! This crate provides:
//! - A [`Gate`] that admits many small operations with one atomic increment
//!   and lets bulk operations drain them for an exclusive, quiescent view
//! - [`Unit`]s holding named [`Account`] balances, owned by a [`Ledger`]
//! - [`Transaction`]s with all-or-nothing multi-account commits
//! - A flat-file [`snapshot`] codec used by [`Ledger::save`] and [`Ledger::load`]
//!
//! ## Lifecycle
//!
//! A new ledger starts with its gate closed. Load a snapshot (or not), then
//! open the gate before issuing transactional operations:
//!
//! ```rust
//! use tally_core::Ledger;
//!
//! let ledger = Ledger::new();
//! assert!(ledger.gate().open());
//!
//! ledger.add_unit(1).unwrap();
//! ledger.add_unit(2).unwrap();
//!
//! let mut tx = ledger.begin();
//! tx.credit(1, "cash", 100).unwrap();
//! tx.commit().unwrap();
//!
//! ledger.transfer((1, "cash"), (2, "cash"), 40).unwrap();
//! assert_eq!(ledger.balance(2, "cash"), Some(40));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod gate;
mod ledger;
mod sink;
pub mod snapshot;
mod stats;
mod transaction;
mod types;
mod unit;

pub use config::Config;
pub use error::{LedgerError, LedgerResult, RejectReason};
pub use gate::{Gate, GateGuard};
pub use ledger::{Ledger, LoadReport, Totals};
pub use sink::{EventSink, LedgerEvent, NullSink, TracingSink};
pub use stats::LedgerStats;
pub use transaction::{Operation, OperationKind, Transaction, TransactionState};
pub use types::{is_valid_account_key, Balance, UnitId};
pub use unit::{Account, Unit};

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
