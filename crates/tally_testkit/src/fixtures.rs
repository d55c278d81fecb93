//! Test fixtures and ledger helpers.
//!
//! Provides convenience functions for setting up ledgers and the snapshot
//! files they save to.

use crate::sink::RecordingSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_core::{Balance, Config, Ledger, Totals, UnitId};
use tempfile::TempDir;

/// File name used for the fixture snapshot.
pub const SNAPSHOT_FILE: &str = "ledger.snap";

/// A test ledger with a temporary snapshot directory and a recording sink.
pub struct TestLedger {
    /// The ledger instance.
    pub ledger: Ledger,
    /// Diagnostic events emitted by the ledger.
    pub sink: Arc<RecordingSink>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestLedger {
    /// Creates a ledger whose gate is already open.
    pub fn open() -> Self {
        let fixture = Self::closed();
        assert!(fixture.ledger.gate().open(), "Failed to open gate");
        fixture
    }

    /// Creates a ledger whose gate is still closed.
    pub fn closed() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a closed ledger with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let sink = Arc::new(RecordingSink::new());
        let ledger = Ledger::with_sink(config, sink.clone());
        Self {
            ledger,
            sink,
            temp_dir,
        }
    }

    /// Returns the default snapshot path inside the temporary directory.
    pub fn snapshot_path(&self) -> PathBuf {
        self.temp_dir.path().join(SNAPSHOT_FILE)
    }

    /// Returns the temporary directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns a path for an extra file inside the temporary directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Creates the given units and sets their balances.
    pub fn seed(&self, units: &[(UnitId, &[(&str, Balance)])]) {
        seed(&self.ledger, units);
    }

    /// Saves to the fixture snapshot and loads it into a fresh, opened ledger.
    pub fn save_and_reload(&self) -> Ledger {
        let path = self.snapshot_path();
        self.ledger.save(&path).expect("Failed to save snapshot");

        let restored = Ledger::new();
        restored.load(&path).expect("Failed to load snapshot");
        assert!(restored.gate().open(), "Failed to open gate");
        restored
    }

    /// Writes raw snapshot text to the fixture snapshot path.
    pub fn write_snapshot(&self, text: &str) -> PathBuf {
        let path = self.snapshot_path();
        std::fs::write(&path, text).expect("Failed to write snapshot");
        path
    }
}

impl std::ops::Deref for TestLedger {
    type Target = Ledger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

/// Creates the given units on an open ledger and sets their balances.
pub fn seed(ledger: &Ledger, units: &[(UnitId, &[(&str, Balance)])]) {
    for (id, accounts) in units {
        if !ledger.unit_ids().contains(id) {
            ledger.add_unit(*id).expect("Failed to add unit");
        }
        ledger
            .transaction(|tx| {
                for (key, balance) in accounts.iter() {
                    tx.set(*id, key, *balance)?;
                }
                Ok(())
            })
            .expect("Failed to seed balances");
    }
}

/// Builds a [`Totals`] map from literal data.
pub fn totals(units: &[(UnitId, &[(&str, Balance)])]) -> Totals {
    units
        .iter()
        .map(|(id, accounts)| {
            let accounts = accounts
                .iter()
                .map(|(key, balance)| ((*key).to_string(), *balance))
                .collect();
            (*id, accounts)
        })
        .collect()
}

/// Returns the sum of every balance in `totals`.
pub fn sum(totals: &Totals) -> i128 {
    totals
        .values()
        .flat_map(|accounts| accounts.values())
        .map(|balance| i128::from(*balance))
        .sum()
}

/// Runs a test with an opened temporary ledger.
///
/// # Example
///
/// ```rust,ignore
/// use tally_testkit::with_ledger;
///
/// #[test]
/// fn my_test() {
///     with_ledger(|ledger| {
///         ledger.add_unit(1).unwrap();
///     });
/// }
/// ```
pub fn with_ledger<F, R>(f: F) -> R
where
    F: FnOnce(&Ledger) -> R,
{
    let fixture = TestLedger::open();
    f(&fixture.ledger)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates an opened ledger with `units` units holding one funded
    /// `"cash"` account each.
    pub fn funded_ledger(units: UnitId, balance: Balance) -> TestLedger {
        let fixture = TestLedger::open();
        for id in 0..units {
            fixture.seed(&[(id, &[("cash", balance)])]);
        }
        fixture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::LedgerError;

    #[test]
    fn open_fixture_admits_operations() {
        let fixture = TestLedger::open();
        fixture.add_unit(1).unwrap();
        assert_eq!(fixture.unit_count(), 1);
    }

    #[test]
    fn closed_fixture_refuses_operations() {
        let fixture = TestLedger::closed();
        assert!(matches!(
            fixture.add_unit(1),
            Err(LedgerError::GateUnavailable)
        ));
    }

    #[test]
    fn totals_example() {
        let fixture = TestLedger::open();
        fixture.seed(&[(1, &[("a", 100), ("b", 50)]), (2, &[("c", 30)])]);

        assert_eq!(
            fixture.total().unwrap(),
            totals(&[(1, &[("a", 100), ("b", 50)]), (2, &[("c", 30)])])
        );
    }

    #[test]
    fn save_and_reload_reproduces_balances() {
        let fixture = TestLedger::open();
        fixture.seed(&[(1, &[("a", 100), ("b", 50)]), (2, &[("c", 30)]), (-9, &[("z", 0)])]);

        let restored = fixture.save_and_reload();
        assert_eq!(restored.total().unwrap(), fixture.total().unwrap());
    }

    #[test]
    fn funded_scenario() {
        let fixture = scenarios::funded_ledger(4, 25);
        let totals = fixture.total().unwrap();
        assert_eq!(totals.len(), 4);
        assert_eq!(sum(&totals), 100);
    }

    #[test]
    fn with_ledger_runs_closure() {
        let units = with_ledger(|ledger| {
            ledger.add_unit(5).unwrap();
            ledger.unit_ids()
        });
        assert_eq!(units, vec![5]);
    }
}
