//! Stress tests for Tally.
//!
//! These drivers run many small transactions from several threads while
//! other threads repeatedly snapshot the ledger and check every file they
//! write.

use crate::fixtures::sum;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tally_core::snapshot;
use tally_core::{Balance, Ledger, LedgerError, UnitId};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations attempted.
    pub total_ops: usize,
    /// Committed operations.
    pub successful_ops: usize,
    /// Operations rejected by validation.
    pub rejected_ops: usize,
    /// Operations refused because the gate was closed.
    pub gate_refusals: usize,
    /// Snapshots written during the run.
    pub snapshots: usize,
    /// Snapshots whose balances did not add up to the starting total.
    pub inconsistent_snapshots: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    fn new(
        successful: usize,
        rejected: usize,
        refused: usize,
        snapshots: usize,
        inconsistent_snapshots: usize,
        duration: Duration,
    ) -> Self {
        let total = successful + rejected + refused;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            rejected_ops: rejected,
            gate_refusals: refused,
            snapshots,
            inconsistent_snapshots,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Committed: {}", self.successful_ops);
        println!("Rejected: {}", self.rejected_ops);
        println!("Gate refusals: {}", self.gate_refusals);
        println!("Snapshots: {}", self.snapshots);
        println!("Inconsistent snapshots: {}", self.inconsistent_snapshots);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Transfers attempted per worker thread.
    pub operations: usize,
    /// Number of worker threads.
    pub threads: usize,
    /// Units taking part; each holds one `"cash"` account.
    pub units: UnitId,
    /// Largest transfer amount.
    pub max_amount: Balance,
    /// Number of threads saving snapshots concurrently.
    pub savers: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 2_000,
            threads: 4,
            units: 8,
            max_amount: 50,
            savers: 2,
        }
    }
}

/// Runs concurrent transfers between the `"cash"` accounts of units
/// `0..config.units` while `config.savers` threads save snapshots into
/// `snapshot_dir`.
///
/// Each saver reads back every snapshot it writes and counts it as
/// inconsistent unless its balances add up to the total at the start of the
/// run. The ledger must be open and the units funded. Transfers refused by a
/// closed gate are counted, not retried.
pub fn stress_transfers_with_snapshots(
    ledger: &Ledger,
    config: &StressConfig,
    snapshot_dir: &Path,
) -> StressTestResult {
    let expected = sum(&ledger.total().expect("ledger gate must be open"));
    let successful = AtomicUsize::new(0);
    let rejected = AtomicUsize::new(0);
    let refused = AtomicUsize::new(0);
    let snapshots = AtomicUsize::new(0);
    let inconsistent = AtomicUsize::new(0);
    let done = AtomicBool::new(false);
    let start = Instant::now();

    thread::scope(|scope| {
        let workers: Vec<_> = (0..config.threads)
            .map(|worker| {
                let (successful, rejected, refused) = (&successful, &rejected, &refused);
                scope.spawn(move || {
                    for i in 0..config.operations {
                        let seed = worker * 7919 + i * 104_729;
                        let from = (seed as UnitId) % config.units;
                        let to = (from + 1 + (i as UnitId) % (config.units - 1).max(1)) % config.units;
                        let amount = 1 + (seed as Balance) % config.max_amount.max(1);

                        match ledger.transfer((from, "cash"), (to, "cash"), amount) {
                            Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                            Err(LedgerError::GateUnavailable) => refused.fetch_add(1, Ordering::Relaxed),
                            Err(_) => rejected.fetch_add(1, Ordering::Relaxed),
                        };
                    }
                })
            })
            .collect();

        for saver in 0..config.savers {
            let path = snapshot_dir.join(format!("stress-{saver}.snap"));
            let (done, snapshots, inconsistent) = (&done, &snapshots, &inconsistent);
            scope.spawn(move || loop {
                let finished = done.load(Ordering::SeqCst);
                if ledger.save(&path).is_ok() {
                    snapshots.fetch_add(1, Ordering::Relaxed);
                    if snapshot_sum(&path) != Some(expected) {
                        inconsistent.fetch_add(1, Ordering::Relaxed);
                    }
                }
                if finished {
                    break;
                }
                thread::sleep(Duration::from_millis(1));
            });
        }

        for worker in workers {
            worker.join().expect("stress worker panicked");
        }
        done.store(true, Ordering::SeqCst);
    });

    StressTestResult::new(
        successful.into_inner(),
        rejected.into_inner(),
        refused.into_inner(),
        snapshots.into_inner(),
        inconsistent.into_inner(),
        start.elapsed(),
    )
}

/// Sums every balance in a snapshot file, or `None` if it cannot be decoded.
fn snapshot_sum(path: &Path) -> Option<i128> {
    let text = snapshot::read_file(path).ok()?;
    let decoded = snapshot::decode_str(&text).ok()?;
    Some(
        decoded
            .records
            .iter()
            .map(|record| i128::from(record.balance))
            .sum(),
    )
}

/// Races `threads` callers creating the same unit id.
///
/// Returns how many of them succeeded.
pub fn stress_add_unit_race(ledger: &Ledger, id: UnitId, threads: usize) -> usize {
    let created = AtomicUsize::new(0);
    thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                if ledger.add_unit(id).is_ok() {
                    created.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });
    created.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{scenarios, sum, TestLedger};

    #[test]
    fn add_unit_race_creates_exactly_one() {
        let fixture = TestLedger::open();
        assert_eq!(stress_add_unit_race(&fixture, 77, 16), 1);

        let a = fixture.get_unit(77).unwrap();
        let b = fixture.get_unit(77).unwrap();
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(fixture.sink.for_unit(77).len(), 15);
    }

    #[test]
    fn transfers_conserve_total_across_snapshots() {
        let fixture = scenarios::funded_ledger(8, 1_000);
        let before = sum(&fixture.total().unwrap());

        let config = StressConfig {
            operations: 500,
            savers: 3,
            ..StressConfig::default()
        };
        let result = stress_transfers_with_snapshots(&fixture, &config, fixture.dir());
        result.print_summary("transfers with snapshots");

        assert_eq!(result.total_ops, config.operations * config.threads);
        assert!(result.snapshots >= config.savers);
        assert_eq!(result.inconsistent_snapshots, 0);
        assert_eq!(fixture.gate().in_flight(), 0);
        assert!(fixture.gate().is_open());
        assert_eq!(sum(&fixture.total().unwrap()), before);

        for saver in 0..config.savers {
            let path = fixture.path(&format!("stress-{saver}.snap"));
            assert_eq!(snapshot_sum(&path), Some(before));
        }
    }
}
