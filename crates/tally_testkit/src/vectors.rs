//! Snapshot format test vectors.
//!
//! Each vector pairs raw snapshot text with the ledger contents it must load
//! into, or the error it must produce. Vectors serialize to JSON so other
//! implementations of the format can check themselves against them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_core::{Balance, UnitId};

/// A snapshot load test vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Raw snapshot text.
    pub input: String,
    /// Ledger contents after loading into an empty ledger.
    ///
    /// For failing vectors these are the records applied before the error.
    pub expected: BTreeMap<UnitId, BTreeMap<String, Balance>>,
    /// Lines skipped as malformed (successful vectors only).
    pub skipped: usize,
    /// 1-based line of the expected parse error, if the load must fail.
    pub error_line: Option<usize>,
}

fn vector(
    id: &str,
    description: &str,
    input: &str,
    expected: &[(UnitId, &[(&str, Balance)])],
    skipped: usize,
    error_line: Option<usize>,
) -> SnapshotVector {
    SnapshotVector {
        id: id.into(),
        description: description.into(),
        input: input.into(),
        expected: crate::fixtures::totals(expected),
        skipped,
        error_line,
    }
}

/// Snapshot load vectors.
pub fn snapshot_vectors() -> Vec<SnapshotVector> {
    vec![
        vector("empty", "Empty file loads nothing", "", &[], 0, None),
        vector(
            "single",
            "One record with terminator",
            "1;100;a\r\n",
            &[(1, &[("a", 100)])],
            0,
            None,
        ),
        vector(
            "no_final_terminator",
            "Final record without CRLF",
            "1;100;a\r\n2;30;c",
            &[(1, &[("a", 100)]), (2, &[("c", 30)])],
            0,
            None,
        ),
        vector(
            "negative_values",
            "Negative ids and balances are numeric",
            "-5;-20;debt\r\n",
            &[(-5, &[("debt", -20)])],
            0,
            None,
        ),
        vector(
            "last_write_wins",
            "Repeated account replaces, never adds",
            "1;10;a\r\n1;15;a\r\n",
            &[(1, &[("a", 15)])],
            0,
            None,
        ),
        vector(
            "short_line_skipped",
            "Two-field line is skipped, later lines still load",
            "1;10\r\n2;20;b\r\n",
            &[(2, &[("b", 20)])],
            1,
            None,
        ),
        vector(
            "long_line_skipped",
            "Four-field line is skipped",
            "1;10;a;extra\r\n2;20;b\r\n",
            &[(2, &[("b", 20)])],
            1,
            None,
        ),
        vector(
            "blank_lines_skipped",
            "Blank lines between records are skipped",
            "1;1;a\r\n\r\n2;2;b\r\n",
            &[(1, &[("a", 1)]), (2, &[("b", 2)])],
            0,
            None,
        ),
        vector(
            "lf_only",
            "LF line endings are not record separators",
            "1;1;a\n2;2;b\n",
            &[],
            1,
            None,
        ),
        vector(
            "bad_id_aborts",
            "Non-numeric id aborts; earlier records stay",
            "1;10;a\r\nx;20;b\r\n3;30;c\r\n",
            &[(1, &[("a", 10)])],
            0,
            Some(2),
        ),
        vector(
            "bad_balance_aborts",
            "Non-numeric balance aborts at first line",
            "1;ten;a\r\n2;20;b\r\n",
            &[],
            0,
            Some(1),
        ),
    ]
}

/// Serializes every vector as pretty-printed JSON.
pub fn snapshot_vectors_json() -> String {
    serde_json::to_string_pretty(&snapshot_vectors()).expect("vectors serialize")
}
