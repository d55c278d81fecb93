//! Ledger statistics.
//!
//! All counters are atomic and can be read while operations are in progress.
//! Values only increase.

use std::sync::atomic::{AtomicU64, Ordering};

/// Ledger statistics and counters.
#[derive(Debug, Default)]
pub struct LedgerStats {
    // Unit counters
    /// Units created through `add_unit` or snapshot load.
    units_created: AtomicU64,

    // Transaction counters
    /// Transactions started.
    transactions_started: AtomicU64,
    /// Transactions committed.
    transactions_committed: AtomicU64,
    /// Transactions rolled back, explicitly or on drop.
    transactions_rolled_back: AtomicU64,
    /// Commits rejected by validation.
    transactions_rejected: AtomicU64,

    // Gate counters
    /// Operations refused because the gate was closed.
    gate_denials: AtomicU64,

    // Snapshot counters
    /// Successful saves.
    snapshots_saved: AtomicU64,
    /// Successful loads.
    snapshots_loaded: AtomicU64,
    /// Records written by saves.
    records_written: AtomicU64,
    /// Records applied by loads.
    records_loaded: AtomicU64,
    /// Malformed lines skipped by loads.
    records_skipped: AtomicU64,
}

impl LedgerStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_unit_created(&self) {
        self.units_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_start(&self) {
        self.transactions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_commit(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_rollback(&self) {
        self.transactions_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_reject(&self) {
        self.transactions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_gate_denial(&self) {
        self.gate_denials.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_save(&self, records: u64) {
        self.snapshots_saved.fetch_add(1, Ordering::Relaxed);
        self.records_written.fetch_add(records, Ordering::Relaxed);
    }

    pub(crate) fn record_load(&self) {
        self.snapshots_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_loaded_record(&self) {
        self.records_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_record(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of units created.
    pub fn units_created(&self) -> u64 {
        self.units_created.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions started.
    pub fn transactions_started(&self) -> u64 {
        self.transactions_started.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions committed.
    pub fn transactions_committed(&self) -> u64 {
        self.transactions_committed.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions rolled back.
    ///
    /// Includes transactions dropped while still open and commits that failed
    /// validation.
    pub fn transactions_rolled_back(&self) -> u64 {
        self.transactions_rolled_back.load(Ordering::Relaxed)
    }

    /// Returns the number of commits rejected by validation.
    pub fn transactions_rejected(&self) -> u64 {
        self.transactions_rejected.load(Ordering::Relaxed)
    }

    /// Returns the number of operations refused by a closed gate.
    pub fn gate_denials(&self) -> u64 {
        self.gate_denials.load(Ordering::Relaxed)
    }

    /// Returns the number of successful saves.
    pub fn snapshots_saved(&self) -> u64 {
        self.snapshots_saved.load(Ordering::Relaxed)
    }

    /// Returns the number of successful loads.
    pub fn snapshots_loaded(&self) -> u64 {
        self.snapshots_loaded.load(Ordering::Relaxed)
    }

    /// Returns the number of records written by saves.
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    /// Returns the number of records applied by loads.
    pub fn records_loaded(&self) -> u64 {
        self.records_loaded.load(Ordering::Relaxed)
    }

    /// Returns the number of malformed lines skipped by loads.
    pub fn records_skipped(&self) -> u64 {
        self.records_skipped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = LedgerStats::new();
        assert_eq!(stats.transactions_started(), 0);
        assert_eq!(stats.gate_denials(), 0);
        assert_eq!(stats.records_written(), 0);
    }

    #[test]
    fn save_accumulates_records() {
        let stats = LedgerStats::new();
        stats.record_save(3);
        stats.record_save(4);
        assert_eq!(stats.snapshots_saved(), 2);
        assert_eq!(stats.records_written(), 7);
    }

    #[test]
    fn transaction_counters() {
        let stats = LedgerStats::new();
        stats.record_transaction_start();
        stats.record_transaction_start();
        stats.record_transaction_commit();
        stats.record_transaction_reject();
        stats.record_transaction_rollback();

        assert_eq!(stats.transactions_started(), 2);
        assert_eq!(stats.transactions_committed(), 1);
        assert_eq!(stats.transactions_rejected(), 1);
        assert_eq!(stats.transactions_rolled_back(), 1);
    }
}
