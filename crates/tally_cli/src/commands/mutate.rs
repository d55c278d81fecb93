//! Mutating commands: each loads the snapshot, commits one change and saves.

use super::{ensure_unit, open_ledger, CommandResult};
use std::path::Path;
use tally_core::{Balance, Ledger, UnitId};

fn save(ledger: &Ledger, path: &Path) -> CommandResult<()> {
    let records = ledger.save(path)?;
    tracing::debug!(path = %path.display(), records, "snapshot written");
    Ok(())
}

fn print_balance(ledger: &Ledger, unit: UnitId, key: &str) {
    match ledger.balance(unit, key) {
        Some(balance) => println!("{unit}/{key}: {balance}"),
        None => println!("{unit}/{key}: (none)"),
    }
}

/// Adds `amount` to an account, creating the unit if needed.
pub fn credit(path: &Path, unit: UnitId, key: &str, amount: Balance) -> CommandResult<()> {
    let ledger = open_ledger(path, false)?;
    ensure_unit(&ledger, unit)?;
    ledger.transaction(|tx| {
        tx.credit(unit, key, amount)?;
        Ok(())
    })?;
    save(&ledger, path)?;
    print_balance(&ledger, unit, key);
    Ok(())
}

/// Subtracts `amount` from an existing account.
pub fn debit(path: &Path, unit: UnitId, key: &str, amount: Balance) -> CommandResult<()> {
    let ledger = open_ledger(path, false)?;
    ledger.transaction(|tx| {
        tx.debit(unit, key, amount)?;
        Ok(())
    })?;
    save(&ledger, path)?;
    print_balance(&ledger, unit, key);
    Ok(())
}

/// Sets an account balance, creating the unit if needed.
pub fn set(path: &Path, unit: UnitId, key: &str, balance: Balance) -> CommandResult<()> {
    let ledger = open_ledger(path, false)?;
    ensure_unit(&ledger, unit)?;
    ledger.transaction(|tx| {
        tx.set(unit, key, balance)?;
        Ok(())
    })?;
    save(&ledger, path)?;
    print_balance(&ledger, unit, key);
    Ok(())
}

/// Moves `amount` between two accounts, creating the destination unit if
/// needed.
pub fn transfer(
    path: &Path,
    from: (UnitId, &str),
    to: (UnitId, &str),
    amount: Balance,
) -> CommandResult<()> {
    let ledger = open_ledger(path, false)?;
    ensure_unit(&ledger, to.0)?;
    ledger.transfer(from, to, amount)?;
    save(&ledger, path)?;
    print_balance(&ledger, from.0, from.1);
    print_balance(&ledger, to.0, to.1);
    Ok(())
}

/// Removes every account of a unit.
pub fn clear(path: &Path, unit: UnitId) -> CommandResult<()> {
    let ledger = open_ledger(path, false)?;
    let removed = ledger.del_unit(unit)?;
    save(&ledger, path)?;
    println!("unit {unit}: removed {} account(s)", removed.len());
    for key in removed {
        println!("  {key}");
    }
    Ok(())
}
