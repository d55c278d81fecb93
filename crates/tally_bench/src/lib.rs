//! Benchmark utilities for Tally.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use tally_core::{Balance, Ledger, UnitId};

/// Opens a ledger with `units` units, each holding `accounts` funded accounts.
pub fn populated_ledger(units: UnitId, accounts: usize, balance: Balance) -> Ledger {
    let ledger = Ledger::new();
    assert!(ledger.gate().open(), "gate should open");
    for unit in 0..units {
        ledger.add_unit(unit).expect("fresh unit id");
        ledger
            .transaction(|tx| {
                for key in account_keys(accounts) {
                    tx.set(unit, &key, balance)?;
                }
                Ok(())
            })
            .expect("seed transaction");
    }
    ledger
}

/// Returns `count` account keys.
pub fn account_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("acct-{i}")).collect()
}
