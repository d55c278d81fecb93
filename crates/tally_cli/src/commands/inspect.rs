//! Inspect command implementation.

use super::{open_ledger, CommandResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tally_core::{Balance, UnitId};

/// Ledger inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Snapshot path.
    pub path: String,
    /// Number of units.
    pub unit_count: usize,
    /// Number of accounts across all units.
    pub account_count: usize,
    /// Sum of every balance, absent on overflow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Balance>,
    /// Per-unit details.
    pub units: Vec<UnitSummary>,
}

/// Balances of a single unit.
#[derive(Debug, Serialize)]
pub struct UnitSummary {
    /// Unit id.
    pub id: UnitId,
    /// Sum of the unit's balances, absent on overflow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Balance>,
    /// Account balances by key.
    pub accounts: BTreeMap<String, Balance>,
}

/// Loads the snapshot and summarizes it.
pub fn inspect(path: &Path) -> CommandResult<InspectResult> {
    let ledger = open_ledger(path, true)?;

    let units: Vec<UnitSummary> = ledger
        .total()?
        .into_iter()
        .map(|(id, accounts)| UnitSummary {
            id,
            total: accounts
                .values()
                .try_fold(0, |acc: Balance, balance| acc.checked_add(*balance)),
            accounts,
        })
        .collect();

    Ok(InspectResult {
        path: path.display().to_string(),
        unit_count: units.len(),
        account_count: units.iter().map(|unit| unit.accounts.len()).sum(),
        total: units
            .iter()
            .try_fold(0, |acc: Balance, unit| acc.checked_add(unit.total?)),
        units,
    })
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> CommandResult<()> {
    let result = inspect(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("Tally Ledger Inspection");
    println!("=======================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Units:    {}", result.unit_count);
    println!("Accounts: {}", result.account_count);
    println!("Total:    {}", format_total(result.total));

    for unit in &result.units {
        println!();
        println!("Unit {} (total {}):", unit.id, format_total(unit.total));
        if unit.accounts.is_empty() {
            println!("  (no accounts)");
        }
        for (key, balance) in &unit.accounts {
            println!("  {key}: {balance}");
        }
    }
}

fn format_total(total: Option<Balance>) -> String {
    total.map_or_else(|| "overflow".to_string(), |total| total.to_string())
}
