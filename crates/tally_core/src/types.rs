//! Core type definitions for Tally.

/// Identifier of a unit within a ledger.
pub type UnitId = i64;

/// Integer balance of an account.
pub type Balance = i64;

/// Returns true if `key` can name an account.
///
/// Keys must survive a snapshot round trip, so they cannot be empty and
/// cannot contain the field separator or a line break.
#[must_use]
pub fn is_valid_account_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(|c: char| matches!(c, ';' | '\r' | '\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys_are_valid() {
        assert!(is_valid_account_key("cash"));
        assert!(is_valid_account_key("savings account #2"));
    }

    #[test]
    fn separator_and_line_breaks_are_rejected() {
        assert!(!is_valid_account_key(""));
        assert!(!is_valid_account_key("a;b"));
        assert!(!is_valid_account_key("a\r\nb"));
        assert!(!is_valid_account_key("a\nb"));
    }
}
