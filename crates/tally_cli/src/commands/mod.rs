//! CLI command implementations.

pub mod inspect;
pub mod mutate;
pub mod verify;

use std::path::{Path, PathBuf};
use tally_core::{Ledger, LedgerError, UnitId};
use thiserror::Error;

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The snapshot file does not exist.
    #[error("no snapshot found at {}", .0.display())]
    MissingSnapshot(PathBuf),

    /// The ledger refused the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// JSON output could not be produced.
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// `verify` found problems.
    #[error("snapshot verification failed with {0} problem(s)")]
    VerificationFailed(usize),
}

/// Result type for CLI commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Loads the snapshot at `path` into a new ledger and opens its gate.
///
/// A missing file yields an empty ledger unless `must_exist` is set.
pub fn open_ledger(path: &Path, must_exist: bool) -> CommandResult<Ledger> {
    let ledger = Ledger::new();
    if path.exists() {
        let report = ledger.load(path)?;
        tracing::debug!(
            path = %path.display(),
            applied = report.applied,
            skipped = report.skipped,
            "snapshot read"
        );
    } else if must_exist {
        return Err(CommandError::MissingSnapshot(path.to_path_buf()));
    }

    if !ledger.gate().open() {
        return Err(LedgerError::GateOpenFailed.into());
    }
    Ok(ledger)
}

/// Creates the unit unless it already exists.
pub fn ensure_unit(ledger: &Ledger, id: UnitId) -> CommandResult<()> {
    if !ledger.unit_ids().contains(&id) {
        ledger.add_unit(id)?;
    }
    Ok(())
}
