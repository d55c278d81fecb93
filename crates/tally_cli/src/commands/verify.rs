//! Verify command implementation.

use super::{CommandError, CommandResult};
use std::collections::HashSet;
use std::path::Path;
use tally_core::snapshot;
use tally_core::{is_valid_account_key, UnitId};

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of non-empty lines checked.
    pub lines_checked: usize,
    /// Number of well-formed records.
    pub valid_records: usize,
    /// Lines that do not have three fields.
    pub skipped_lines: Vec<usize>,
    /// Lines whose account key could not be saved back.
    pub invalid_keys: Vec<usize>,
    /// Records replacing an earlier record for the same account.
    pub overwritten: usize,
    /// First parse error; checking stops there.
    pub error: Option<String>,
}

impl VerifyResult {
    /// Number of problems found.
    pub fn problems(&self) -> usize {
        self.skipped_lines.len() + self.invalid_keys.len() + usize::from(self.error.is_some())
    }

    fn is_ok(&self) -> bool {
        self.problems() == 0
    }
}

/// Checks snapshot text without loading it.
pub fn verify_text(text: &str) -> VerifyResult {
    let mut result = VerifyResult::default();
    let mut seen: HashSet<(UnitId, String)> = HashSet::new();

    for (line_no, line) in snapshot::lines(text) {
        if line.is_empty() {
            continue;
        }
        result.lines_checked += 1;

        match snapshot::decode_line(line_no, line) {
            None => result.skipped_lines.push(line_no),
            Some(Err(e)) => {
                result.error = Some(e.to_string());
                break;
            }
            Some(Ok(record)) => {
                result.valid_records += 1;
                if !is_valid_account_key(&record.key) {
                    result.invalid_keys.push(line_no);
                }
                if !seen.insert((record.unit, record.key)) {
                    result.overwritten += 1;
                }
            }
        }
    }

    result
}

/// Runs the verify command.
pub fn run(path: &Path) -> CommandResult<()> {
    if !path.exists() {
        return Err(CommandError::MissingSnapshot(path.to_path_buf()));
    }

    println!("Verifying snapshot at {:?}", path);
    println!();

    let text = snapshot::read_file(path)?;
    let result = verify_text(&text);
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Snapshot verification passed");
        Ok(())
    } else {
        println!("✗ Snapshot verification failed");
        Err(CommandError::VerificationFailed(result.problems()))
    }
}

fn print_result(result: &VerifyResult) {
    println!("  Lines checked:  {}", result.lines_checked);
    println!("  Valid records:  {}", result.valid_records);
    println!("  Overwritten:    {}", result.overwritten);

    for line in &result.skipped_lines {
        println!("  line {line}: expected 3 fields, line will be skipped");
    }
    for line in &result.invalid_keys {
        println!("  line {line}: account key cannot be saved back");
    }
    if let Some(error) = &result.error {
        println!("  {error}");
    }
}
