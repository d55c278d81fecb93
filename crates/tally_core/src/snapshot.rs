//! Flat-file snapshot codec.
//!
//! A snapshot holds one line per account:
//!
//! ```text
//! <unit-id>;<balance>;<account-key>\r\n
//! ```
//!
//! There is no header and records are unordered. Decoding is tolerant of
//! lines that do not split into exactly three fields (they are skipped) but
//! intolerant of a non-numeric id or balance.

use crate::error::{LedgerError, LedgerResult};
use crate::types::{Balance, UnitId};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Separates the fields of a record.
pub const FIELD_SEPARATOR: char = ';';

/// Terminates every record.
pub const RECORD_TERMINATOR: &str = "\r\n";

/// One account in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Owning unit.
    pub unit: UnitId,
    /// Account balance.
    pub balance: Balance,
    /// Account key.
    pub key: String,
}

impl Record {
    /// Creates a record.
    pub fn new(unit: UnitId, balance: Balance, key: impl Into<String>) -> Self {
        Self {
            unit,
            balance,
            key: key.into(),
        }
    }

    /// Appends the encoded record, terminator included.
    pub fn encode_into(&self, out: &mut String) {
        use std::fmt::Write as _;
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{RECORD_TERMINATOR}",
            self.unit, self.balance, self.key
        );
    }
}

/// Encodes records into snapshot text.
pub fn encode<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out = String::new();
    for record in records {
        record.encode_into(&mut out);
    }
    out
}

/// Splits snapshot text into numbered lines (1-based).
pub fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split(RECORD_TERMINATOR)
        .enumerate()
        .map(|(index, line)| (index + 1, line))
}

/// Decodes one line.
///
/// Returns `None` for lines that must be skipped, which includes the empty
/// remainder after the final terminator.
pub fn decode_line(line_no: usize, line: &str) -> Option<LedgerResult<Record>> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [unit, balance, key] = fields.as_slice() else {
        return None;
    };

    let Ok(unit) = unit.parse::<UnitId>() else {
        return Some(Err(LedgerError::snapshot_parse(line_no, "unit id", *unit)));
    };
    let Ok(balance) = balance.parse::<Balance>() else {
        return Some(Err(LedgerError::snapshot_parse(line_no, "balance", *balance)));
    };
    Some(Ok(Record::new(unit, balance, *key)))
}

/// Result of decoding a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Records in file order.
    pub records: Vec<Record>,
    /// Number of lines skipped as malformed.
    pub skipped: usize,
}

/// Decodes a whole snapshot, stopping at the first parse error.
///
/// The empty remainder after a final terminator is not counted as skipped.
pub fn decode_str(text: &str) -> LedgerResult<Decoded> {
    let mut decoded = Decoded::default();
    for (line_no, line) in lines(text) {
        match decode_line(line_no, line) {
            Some(record) => decoded.records.push(record?),
            None if line.is_empty() => {}
            None => decoded.skipped += 1,
        }
    }
    Ok(decoded)
}

/// Reads snapshot text from a file.
///
/// Bytes that are not valid UTF-8 become U+FFFD. In a key this keeps the
/// record loadable; in an id or balance it still fails to parse.
pub fn read_file(path: &Path) -> LedgerResult<String> {
    let bytes = fs::read(path).map_err(LedgerError::SnapshotRead)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Writes snapshot text to a file, replacing it.
///
/// On unix the file gets `mode` as its permission bits.
pub fn write_file(path: &Path, text: &str, mode: u32) -> LedgerResult<()> {
    write_with_mode(path, text, mode).map_err(LedgerError::SnapshotWrite)
}

fn write_with_mode(path: &Path, text: &str, mode: u32) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options.open(path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;

    // The open mode is filtered by umask and ignored for existing files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}
