//! Ledger facade: unit lifecycle and snapshot I/O.

use crate::config::Config;
use crate::error::{LedgerError, LedgerResult};
use crate::gate::{Gate, GateGuard};
use crate::sink::{EventSink, LedgerEvent, TracingSink};
use crate::snapshot::{self, Record};
use crate::stats::LedgerStats;
use crate::transaction::Transaction;
use crate::types::{Balance, UnitId};
use crate::unit::Unit;
use parking_lot::{Mutex, RwLock};
use std::collections::{hash_map::Entry, BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Balances of every unit: unit id → account key → balance.
pub type Totals = BTreeMap<UnitId, BTreeMap<String, Balance>>;

/// Outcome of a successful [`Ledger::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records applied to the ledger.
    pub applied: usize,
    /// Non-empty lines skipped because they did not have three fields.
    pub skipped: usize,
}

/// An in-memory transactional ledger.
///
/// The ledger owns its units and a [`Gate`]. Transactional operations
/// (`add_unit`, `del_unit`, `total`, `Transaction::commit`) pass through the
/// gate; `save` and `load` close it, wait for in-flight operations to drain,
/// do their I/O, and reopen it.
///
/// # Lifecycle
///
/// The gate starts closed, so a fresh ledger rejects transactional operations
/// until [`Gate::open`] is called. This leaves room for a bootstrap load with
/// no contenders:
///
/// ```rust,no_run
/// use tally_core::Ledger;
/// use std::path::Path;
///
/// let ledger = Ledger::new();
/// ledger.load(Path::new("ledger.snap"))?;
/// assert!(ledger.gate().open());
/// # Ok::<(), tally_core::LedgerError>(())
/// ```
///
/// # Thread Safety
///
/// `Ledger` is `Send + Sync`; share it behind an `Arc`. Units are created at
/// most once per id and never removed, so an `Arc<Unit>` obtained from
/// [`Ledger::get_unit`] stays the unit for that id.
pub struct Ledger {
    /// Configuration.
    config: Config,
    /// Admission/drain coordinator.
    gate: Gate,
    /// Units by id. Entries are only ever inserted.
    units: RwLock<HashMap<UnitId, Arc<Unit>>>,
    /// Held by `save` and `load` from quiesce to resume.
    bulk: Mutex<()>,
    /// Receives diagnostic events.
    sink: Arc<dyn EventSink>,
    /// Counters.
    stats: LedgerStats,
}

impl Ledger {
    /// Creates an empty ledger with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty ledger with custom configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Creates an empty ledger that reports diagnostic events to `sink`.
    #[must_use]
    pub fn with_sink(config: Config, sink: Arc<dyn EventSink>) -> Self {
        Self {
            gate: Gate::new(config.retry_budget),
            config,
            units: RwLock::new(HashMap::new()),
            bulk: Mutex::new(()),
            sink,
            stats: LedgerStats::new(),
        }
    }

    /// Returns the gate guarding transactional operations.
    #[must_use]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the ledger statistics.
    #[must_use]
    pub fn stats(&self) -> &LedgerStats {
        &self.stats
    }

    /// Creates an empty unit.
    ///
    /// When several callers race on the same id exactly one succeeds; the
    /// rest get `UnitExists`.
    ///
    /// # Errors
    ///
    /// `GateUnavailable` if the gate is closed, `UnitExists` if the id is taken.
    pub fn add_unit(&self, id: UnitId) -> LedgerResult<()> {
        let _guard = self.admit("add_unit", Some(id))?;

        if !self.units.read().contains_key(&id) {
            let mut units = self.units.write();
            if let Entry::Vacant(slot) = units.entry(id) {
                slot.insert(Arc::new(Unit::new()));
                self.stats.record_unit_created();
                tracing::debug!(unit = id, "unit created");
                return Ok(());
            }
        }

        self.report("unit already exists", Some(id), "add_unit");
        Err(LedgerError::UnitExists { unit: id })
    }

    /// Returns the unit with this id.
    ///
    /// Lookups are not gated.
    ///
    /// # Errors
    ///
    /// `UnitNotFound` if no unit has this id.
    pub fn get_unit(&self, id: UnitId) -> LedgerResult<Arc<Unit>> {
        self.lookup(id).ok_or_else(|| {
            self.report("unit not found", Some(id), "get_unit");
            LedgerError::UnitNotFound { unit: id }
        })
    }

    /// Removes every account of a unit and returns the removed keys.
    ///
    /// The unit itself remains. An unknown id yields an empty list.
    ///
    /// # Errors
    ///
    /// `GateUnavailable` if the gate is closed.
    pub fn del_unit(&self, id: UnitId) -> LedgerResult<Vec<String>> {
        let _guard = self.admit("del_unit", Some(id))?;

        match self.lookup(id) {
            Some(unit) => {
                let removed = unit.clear();
                tracing::debug!(unit = id, accounts = removed.len(), "unit cleared");
                Ok(removed)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Returns every balance of every unit.
    ///
    /// # Errors
    ///
    /// `GateUnavailable` if the gate is closed.
    pub fn total(&self) -> LedgerResult<Totals> {
        let _guard = self.admit("total", None)?;
        Ok(self.collect_totals())
    }

    /// Begins a transaction.
    #[must_use]
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Runs `f` inside a transaction and commits it.
    ///
    /// If `f` fails the transaction is rolled back and the error returned.
    ///
    /// ```rust
    /// use tally_core::Ledger;
    ///
    /// let ledger = Ledger::new();
    /// ledger.gate().open();
    /// ledger.add_unit(1)?;
    /// ledger.transaction(|tx| {
    ///     tx.credit(1, "cash", 10)?.credit(1, "savings", 5)?;
    ///     Ok(())
    /// })?;
    /// assert_eq!(ledger.balance(1, "savings"), Some(5));
    /// # Ok::<(), tally_core::LedgerError>(())
    /// ```
    pub fn transaction<F, T>(&self, f: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> LedgerResult<T>,
    {
        let mut tx = self.begin();
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if tx.is_open() {
                    tx.rollback()?;
                }
                Err(err)
            }
        }
    }

    /// Moves `amount` between two accounts atomically.
    ///
    /// # Errors
    ///
    /// As [`Transaction::commit`].
    pub fn transfer(
        &self,
        from: (UnitId, &str),
        to: (UnitId, &str),
        amount: Balance,
    ) -> LedgerResult<()> {
        self.transaction(|tx| {
            tx.debit(from.0, from.1, amount)?.credit(to.0, to.1, amount)?;
            Ok(())
        })
    }

    /// Returns the balance of an account, if the unit and account exist.
    #[must_use]
    pub fn balance(&self, id: UnitId, key: &str) -> Option<Balance> {
        self.lookup(id).and_then(|unit| unit.balance(key))
    }

    /// Returns every unit id, sorted.
    #[must_use]
    pub fn unit_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.units.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.read().len()
    }

    /// Writes a snapshot of every account to `path`.
    ///
    /// If the gate is open it is closed and drained first, then reopened.
    /// Concurrent `save` and `load` calls run one at a time. Returns the
    /// number of records written.
    ///
    /// # Errors
    ///
    /// - `GateCloseFailed` if in-flight operations did not drain. Nothing is
    ///   written and the gate is reopened.
    /// - `SnapshotWrite` if the file could not be written.
    /// - `GateOpenFailed` if the gate could not be reopened. The snapshot has
    ///   been written in that case.
    pub fn save(&self, path: &Path) -> LedgerResult<usize> {
        let _bulk = self.bulk.lock();
        let was_open = self.quiesce("save")?;
        let written = self.write_snapshot(path);
        let resumed = self.resume(was_open, "save");

        let written = written?;
        resumed?;
        self.stats.record_save(written as u64);
        tracing::info!(path = %path.display(), records = written, "snapshot saved");
        Ok(written)
    }

    /// Reads a snapshot from `path` into the ledger.
    ///
    /// Each record creates its unit if needed and replaces the account
    /// balance; later records for the same account win. Lines without
    /// exactly three fields are skipped.
    ///
    /// # Errors
    ///
    /// - `GateCloseFailed` if in-flight operations did not drain.
    /// - `SnapshotRead` if the file could not be read.
    /// - `SnapshotParse` on a non-numeric id or balance. Records before the
    ///   failing line stay applied.
    /// - `GateOpenFailed` if the gate could not be reopened.
    ///
    /// The gate is reopened (if it was open) whether or not loading failed.
    pub fn load(&self, path: &Path) -> LedgerResult<LoadReport> {
        let _bulk = self.bulk.lock();
        let was_open = self.quiesce("load")?;
        let report = self.read_snapshot(path);
        let resumed = self.resume(was_open, "load");

        let report = report?;
        resumed?;
        self.stats.record_load();
        tracing::info!(
            path = %path.display(),
            applied = report.applied,
            skipped = report.skipped,
            "snapshot loaded"
        );
        Ok(report)
    }

    pub(crate) fn lookup(&self, id: UnitId) -> Option<Arc<Unit>> {
        self.units.read().get(&id).cloned()
    }

    /// Admits one gated operation.
    pub(crate) fn admit(
        &self,
        operation: &'static str,
        unit: Option<UnitId>,
    ) -> LedgerResult<GateGuard<'_>> {
        self.gate.admit().ok_or_else(|| {
            self.stats.record_gate_denial();
            tracing::debug!(operation, unit, "gate closed; operation refused");
            LedgerError::GateUnavailable
        })
    }

    /// Sends a diagnostic event to the sink.
    pub(crate) fn report(
        &self,
        message: impl Into<String>,
        unit: Option<UnitId>,
        operation: &'static str,
    ) {
        self.sink.record(&LedgerEvent::new(message, unit, operation));
    }

    /// Closes and drains the gate if it is open. Returns whether it was.
    fn quiesce(&self, operation: &'static str) -> LedgerResult<bool> {
        let was_open = self.gate.is_open();
        if was_open && !self.gate.close() {
            if !self.gate.open() {
                self.report("gate left closed after failed drain", None, operation);
            }
            self.report("gate drain timed out", None, operation);
            return Err(LedgerError::GateCloseFailed);
        }
        Ok(was_open)
    }

    fn resume(&self, was_open: bool, operation: &'static str) -> LedgerResult<()> {
        if was_open && !self.gate.open() {
            self.report("gate could not be reopened", None, operation);
            return Err(LedgerError::GateOpenFailed);
        }
        Ok(())
    }

    fn collect_totals(&self) -> Totals {
        self.units
            .read()
            .iter()
            .map(|(id, unit)| (*id, unit.total()))
            .collect()
    }

    fn write_snapshot(&self, path: &Path) -> LedgerResult<usize> {
        let records: Vec<Record> = self
            .collect_totals()
            .into_iter()
            .flat_map(|(unit, accounts)| {
                accounts
                    .into_iter()
                    .map(move |(key, balance)| Record::new(unit, balance, key))
            })
            .collect();
        snapshot::write_file(path, &snapshot::encode(&records), self.config.snapshot_mode)?;
        Ok(records.len())
    }

    fn read_snapshot(&self, path: &Path) -> LedgerResult<LoadReport> {
        let text = snapshot::read_file(path)?;
        let mut report = LoadReport::default();
        let mut units = self.units.write();

        for (line_no, line) in snapshot::lines(&text) {
            let record = match snapshot::decode_line(line_no, line) {
                Some(record) => record?,
                None => {
                    if !line.is_empty() {
                        report.skipped += 1;
                        self.stats.record_skipped_record();
                        tracing::debug!(line = line_no, "malformed snapshot line skipped");
                    }
                    continue;
                }
            };

            let unit = units.entry(record.unit).or_insert_with(|| {
                self.stats.record_unit_created();
                Arc::new(Unit::new())
            });
            unit.replace(&record.key, record.balance);
            report.applied += 1;
            self.stats.record_loaded_record();
        }
        Ok(report)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("open", &self.gate.is_open())
            .field("in_flight", &self.gate.in_flight())
            .field("units", &self.unit_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullSink;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn open_ledger() -> Ledger {
        let ledger = Ledger::new();
        assert!(ledger.gate().open());
        ledger
    }

    fn seed(ledger: &Ledger, units: &[(UnitId, &[(&str, Balance)])]) {
        for (id, accounts) in units {
            ledger.add_unit(*id).unwrap();
            ledger
                .transaction(|tx| {
                    for (key, balance) in accounts.iter() {
                        tx.set(*id, key, *balance)?;
                    }
                    Ok(())
                })
                .unwrap();
        }
    }

    #[test]
    fn fresh_ledger_refuses_gated_operations() {
        let ledger = Ledger::new();
        assert!(matches!(ledger.add_unit(1), Err(LedgerError::GateUnavailable)));
        assert!(matches!(ledger.total(), Err(LedgerError::GateUnavailable)));
        assert!(matches!(ledger.del_unit(1), Err(LedgerError::GateUnavailable)));
        assert_eq!(ledger.stats().gate_denials(), 3);
    }

    #[test]
    fn add_then_get_unit() {
        let ledger = open_ledger();
        ledger.add_unit(7).unwrap();

        let a = ledger.get_unit(7).unwrap();
        let b = ledger.get_unit(7).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_empty());
    }

    #[test]
    fn duplicate_unit_is_rejected() {
        let ledger = open_ledger();
        ledger.add_unit(7).unwrap();
        assert!(matches!(
            ledger.add_unit(7),
            Err(LedgerError::UnitExists { unit: 7 })
        ));
        assert_eq!(ledger.unit_count(), 1);
    }

    #[test]
    fn missing_unit_is_not_found() {
        let ledger = open_ledger();
        assert!(matches!(
            ledger.get_unit(3),
            Err(LedgerError::UnitNotFound { unit: 3 })
        ));
    }

    #[test]
    fn get_unit_ignores_gate() {
        let ledger = open_ledger();
        ledger.add_unit(1).unwrap();
        assert!(ledger.gate().close());
        assert!(ledger.get_unit(1).is_ok());
    }

    #[test]
    fn concurrent_add_unit_creates_one() {
        let ledger = Arc::new(open_ledger());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || ledger.add_unit(42).is_ok())
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(created, 1);
        assert_eq!(ledger.unit_count(), 1);
        assert_eq!(ledger.stats().units_created(), 1);
    }

    #[test]
    fn del_unit_clears_accounts_but_keeps_unit() {
        let ledger = open_ledger();
        seed(&ledger, &[(1, &[("a", 1), ("b", 2)])]);

        let removed = ledger.del_unit(1).unwrap();
        assert_eq!(removed, vec!["a".to_string(), "b".to_string()]);

        let unit = ledger.get_unit(1).unwrap();
        assert_eq!(unit.account_count(), 0);
        assert!(ledger.del_unit(1).unwrap().is_empty());
    }

    #[test]
    fn del_unknown_unit_is_empty() {
        let ledger = open_ledger();
        assert!(ledger.del_unit(5).unwrap().is_empty());
    }

    #[test]
    fn total_reports_every_balance() {
        let ledger = open_ledger();
        seed(&ledger, &[(1, &[("a", 100), ("b", 50)]), (2, &[("c", 30)])]);

        let mut expected = Totals::new();
        expected.insert(1, BTreeMap::from([("a".into(), 100), ("b".into(), 50)]));
        expected.insert(2, BTreeMap::from([("c".into(), 30)]));
        assert_eq!(ledger.total().unwrap(), expected);
    }

    #[test]
    fn transfer_moves_funds() {
        let ledger = open_ledger();
        seed(&ledger, &[(1, &[("cash", 100)]), (2, &[])]);

        ledger.transfer((1, "cash"), (2, "cash"), 60).unwrap();
        assert_eq!(ledger.balance(1, "cash"), Some(40));
        assert_eq!(ledger.balance(2, "cash"), Some(60));

        assert!(ledger.transfer((1, "cash"), (2, "cash"), 41).is_err());
        assert_eq!(ledger.balance(1, "cash"), Some(40));
    }

    #[test]
    fn transaction_helper_rolls_back_on_error() {
        let ledger = open_ledger();
        seed(&ledger, &[(1, &[])]);

        let result: LedgerResult<()> = ledger.transaction(|tx| {
            tx.credit(1, "cash", 5)?;
            Err(LedgerError::UnitNotFound { unit: 9 })
        });
        assert!(result.is_err());
        assert_eq!(ledger.balance(1, "cash"), None);
    }

    #[test]
    fn save_writes_one_record_per_account() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        let ledger = open_ledger();
        seed(&ledger, &[(1, &[("a", 100), ("b", 50)]), (2, &[("c", 30)])]);

        assert_eq!(ledger.save(&path).unwrap(), 3);
        assert!(ledger.gate().is_open());

        let text = fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["1;100;a", "1;50;b", "2;30;c"]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        let ledger = open_ledger();
        seed(&ledger, &[(1, &[("a", 100), ("b", 0)]), (-3, &[("c", 30)]), (4, &[])]);
        ledger.save(&path).unwrap();

        let restored = Ledger::new();
        let report = restored.load(&path).unwrap();
        assert_eq!(report, LoadReport { applied: 3, skipped: 0 });
        assert!(!restored.gate().is_open());

        assert!(restored.gate().open());
        let mut expected = ledger.total().unwrap();
        // Units without accounts leave no record.
        expected.remove(&4);
        assert_eq!(restored.total().unwrap(), expected);
    }

    #[test]
    fn load_replaces_balances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        fs::write(&path, "1;10;a\r\n1;25;a\r\n").unwrap();

        let ledger = open_ledger();
        seed(&ledger, &[(1, &[("a", 999)])]);
        ledger.load(&path).unwrap();

        assert_eq!(ledger.balance(1, "a"), Some(25));
        assert!(ledger.gate().is_open());
    }

    #[test]
    fn load_skips_short_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        fs::write(&path, "1;10\r\n2;20;b\r\n").unwrap();

        let ledger = Ledger::new();
        let report = ledger.load(&path).unwrap();
        assert_eq!(report, LoadReport { applied: 1, skipped: 1 });
        assert_eq!(ledger.balance(2, "b"), Some(20));
        assert_eq!(ledger.stats().records_skipped(), 1);
    }

    #[test]
    fn load_aborts_on_bad_id_with_partial_effect() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        fs::write(&path, "1;10;a\r\nx;20;b\r\n3;30;c\r\n").unwrap();

        let ledger = open_ledger();
        let err = ledger.load(&path).unwrap_err();

        assert!(matches!(err, LedgerError::SnapshotParse { line: 2, .. }));
        assert_eq!(ledger.balance(1, "a"), Some(10));
        assert_eq!(ledger.balance(3, "c"), None);
        assert!(ledger.gate().is_open());
        assert_eq!(ledger.stats().snapshots_loaded(), 0);
    }

    #[test]
    fn load_accepts_non_utf8_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        fs::write(&path, b"1;10;a\r\n2;20;\xff\xfe\r\n").unwrap();

        let ledger = Ledger::new();
        let report = ledger.load(&path).unwrap();
        assert_eq!(report, LoadReport { applied: 2, skipped: 0 });
        assert_eq!(ledger.balance(1, "a"), Some(10));
        assert_eq!(ledger.balance(2, "\u{FFFD}\u{FFFD}"), Some(20));
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let ledger = open_ledger();
        let err = ledger.load(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LedgerError::SnapshotRead(_)));
        assert!(ledger.gate().is_open());
    }

    #[test]
    fn save_to_bad_path_fails_and_reopens() {
        let dir = TempDir::new().unwrap();
        let ledger = open_ledger();
        let err = ledger.save(&dir.path().join("missing/dir/ledger.snap")).unwrap_err();
        assert!(matches!(err, LedgerError::SnapshotWrite(_)));
        assert!(ledger.gate().is_open());
    }

    #[test]
    fn save_fails_while_operation_in_flight() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        let ledger = Ledger::with_sink(Config::new().retry_budget(8), Arc::new(NullSink));
        ledger.gate().open();

        let guard = ledger.gate().admit().unwrap();
        assert!(matches!(ledger.save(&path), Err(LedgerError::GateCloseFailed)));
        assert!(!path.exists());
        assert!(ledger.gate().is_open());
        drop(guard);

        assert_eq!(ledger.save(&path).unwrap(), 0);
    }

    #[test]
    fn concurrent_saves_each_see_one_instant() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

        let dir = TempDir::new().unwrap();
        let ledger = open_ledger();
        for id in 0..8 {
            seed(&ledger, &[(id, &[("cash", 1_000)])]);
        }
        let expected: i128 = 8_000;
        let done = AtomicBool::new(false);
        let inconsistent = AtomicUsize::new(0);
        let checked = AtomicUsize::new(0);

        thread::scope(|scope| {
            let workers: Vec<_> = (0..4i64)
                .map(|worker| {
                    let ledger = &ledger;
                    scope.spawn(move || {
                        for i in 0..2_000i64 {
                            let from = (worker + i) % 8;
                            let to = (from + 1 + i % 7) % 8;
                            let _ = ledger.transfer((from, "cash"), (to, "cash"), 1 + i % 13);
                        }
                    })
                })
                .collect();

            for saver in 0..3 {
                let path = dir.path().join(format!("saver-{saver}.snap"));
                let (ledger, done, inconsistent, checked) =
                    (&ledger, &done, &inconsistent, &checked);
                scope.spawn(move || loop {
                    let finished = done.load(Ordering::SeqCst);
                    if ledger.save(&path).is_ok() {
                        let text = snapshot::read_file(&path).unwrap();
                        let decoded = snapshot::decode_str(&text).unwrap();
                        let sum: i128 = decoded
                            .records
                            .iter()
                            .map(|record| i128::from(record.balance))
                            .sum();
                        if sum != expected {
                            inconsistent.fetch_add(1, Ordering::SeqCst);
                        }
                        checked.fetch_add(1, Ordering::SeqCst);
                    }
                    if finished {
                        break;
                    }
                });
            }

            for worker in workers {
                worker.join().unwrap();
            }
            done.store(true, Ordering::SeqCst);
        });

        assert!(checked.load(Ordering::SeqCst) > 0);
        assert_eq!(inconsistent.load(Ordering::SeqCst), 0);
        assert_eq!(ledger.gate().in_flight(), 0);
        assert!(ledger.gate().is_open());
    }

    #[test]
    fn save_leaves_closed_gate_closed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.snap");
        let ledger = Ledger::new();

        ledger.save(&path).unwrap();
        assert!(!ledger.gate().is_open());
        assert_eq!(ledger.stats().snapshots_saved(), 1);
    }
}
