//! # Tally Testkit
//!
//! Test utilities for Tally.
//!
//! This crate provides:
//! - Ledger fixtures backed by temporary snapshot directories
//! - A recording event sink for asserting on diagnostics
//! - Property-based test generators using proptest
//! - Snapshot format test vectors
//! - Concurrent stress drivers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_testkit::prelude::*;
//!
//! #[test]
//! fn transfers_survive_a_snapshot() {
//!     let fixture = TestLedger::open();
//!     fixture.seed(&[(1, &[("cash", 10)])]);
//!     fixture.save_and_reload();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod sink;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::sink::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use sink::*;
pub use stress::*;
pub use vectors::*;
