//! Admission and drain coordination.
//!
//! The gate decides whether transactional operations may run. Admission costs
//! one atomic increment and one flag load, so the hot path never touches a
//! mutex. Bulk operations close the gate and wait for in-flight operations to
//! drain, which gives them a quiescent view of the ledger.
//!
//! ```rust
//! use tally_core::Gate;
//!
//! let gate = Gate::new(100);
//! assert!(!gate.enter()); // starts closed
//!
//! assert!(gate.open());
//! {
//!     let _guard = gate.admit().expect("gate is open");
//!     assert_eq!(gate.in_flight(), 1);
//!     assert!(!gate.close()); // cannot drain while the guard is held
//! }
//! assert!(gate.close());
//! ```
//!
//! # Ordering
//!
//! `enter` increments the counter before it re-checks the flag, and `close`
//! clears the flag before it reads the counter. With sequentially consistent
//! operations this means a `close` that observed zero in-flight operations
//! cannot be followed by a successful `enter` until the gate is reopened.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::thread;

/// Admission/drain coordinator.
#[derive(Debug)]
pub struct Gate {
    /// Admission flag.
    open: AtomicBool,
    /// Number of admitted operations that have not left yet.
    in_flight: AtomicI64,
    /// Attempts made by `open` and `close`.
    retry_budget: u32,
}

impl Gate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new(retry_budget: u32) -> Self {
        Self {
            open: AtomicBool::new(false),
            in_flight: AtomicI64::new(0),
            retry_budget: retry_budget.max(1),
        }
    }

    /// Opens the gate.
    ///
    /// Returns false only if the retry budget is exhausted.
    pub fn open(&self) -> bool {
        for _ in 0..self.retry_budget {
            if self.open.load(Ordering::SeqCst)
                || self
                    .open
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                return true;
            }
            thread::yield_now();
        }
        false
    }

    /// Closes the gate and waits for in-flight operations to drain.
    ///
    /// Returns false if the counter did not reach zero within the retry
    /// budget. The gate stays closed in that case.
    pub fn close(&self) -> bool {
        for _ in 0..self.retry_budget {
            let closed = !self.open.load(Ordering::SeqCst)
                || self
                    .open
                    .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok();
            if closed && self.in_flight.load(Ordering::SeqCst) == 0 {
                return true;
            }
            thread::yield_now();
        }
        false
    }

    /// Admits one operation if the gate is open.
    ///
    /// Every successful call must be paired with exactly one [`Gate::leave`].
    /// Prefer [`Gate::admit`], which pairs them automatically.
    pub fn enter(&self) -> bool {
        if !self.open.load(Ordering::SeqCst) {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if self.open.load(Ordering::SeqCst) {
            return true;
        }
        // Closed between the two loads.
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        false
    }

    /// Releases an admission obtained by [`Gate::enter`].
    ///
    /// Calling this without a matching successful `enter` would let `close`
    /// report a drained gate while an operation is still running. An
    /// unmatched call on a zero counter is therefore ignored and logged, but
    /// one that steals another caller's admission cannot be detected. Use
    /// [`Gate::admit`] unless the pairing is obvious.
    pub fn leave(&self) {
        let released = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n > 0 {
                    Some(n - 1)
                } else {
                    None
                }
            });
        if released.is_err() {
            tracing::warn!("gate leave without matching enter ignored");
        }
    }

    /// Admits one operation and returns a guard that leaves on drop.
    #[must_use]
    pub fn admit(&self) -> Option<GateGuard<'_>> {
        if self.enter() {
            Some(GateGuard { gate: self })
        } else {
            None
        }
    }

    /// Returns true if the gate currently admits operations.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Returns the number of admitted operations still in flight.
    #[must_use]
    pub fn in_flight(&self) -> i64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns the retry budget used by `open` and `close`.
    #[must_use]
    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }
}

/// Scoped admission through a [`Gate`].
///
/// Dropping the guard calls [`Gate::leave`], so early returns and panics
/// release the admission too.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a Gate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}
