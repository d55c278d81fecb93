//! Property-based test generators using proptest.
//!
//! Provides strategies for generating ledger contents and operation batches
//! that respect the ledger's key and id rules.

use proptest::prelude::*;
use std::collections::BTreeMap;
use tally_core::{Balance, Operation, OperationKind, Totals, UnitId};

/// Strategy for account keys that survive a snapshot round trip.
pub fn account_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_ #.-]{1,16}").expect("Invalid regex")
}

/// Strategy for unit ids, including negative ones.
pub fn unit_id_strategy() -> impl Strategy<Value = UnitId> {
    prop_oneof![-50i64..50, any::<i64>()]
}

/// Strategy for non-negative balances.
pub fn balance_strategy() -> impl Strategy<Value = Balance> {
    prop_oneof![0i64..1_000, 0i64..=Balance::MAX]
}

/// Strategy for full ledger contents.
pub fn totals_strategy(max_units: usize, max_accounts: usize) -> impl Strategy<Value = Totals> {
    prop::collection::btree_map(
        unit_id_strategy(),
        prop::collection::btree_map(account_key_strategy(), balance_strategy(), 0..=max_accounts),
        0..=max_units,
    )
}

/// Strategy for one operation against units `0..units` and a small key set.
pub fn operation_strategy(units: UnitId) -> impl Strategy<Value = Operation> {
    let kind = prop_oneof![
        (0i64..200).prop_map(OperationKind::Credit),
        (0i64..200).prop_map(OperationKind::Debit),
        (0i64..200).prop_map(OperationKind::Set),
    ];
    (0..units, prop::sample::select(vec!["a", "b", "c"]), kind)
        .prop_map(|(unit, key, kind)| Operation::new(unit, key, kind))
}

/// Strategy for a batch of operations.
pub fn batch_strategy(units: UnitId, max_len: usize) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(units), 0..=max_len)
}

/// Applies `batch` to a copy of `totals` the way a commit would.
///
/// Returns `None` if any operation would be rejected.
pub fn model_commit(totals: &Totals, batch: &[Operation]) -> Option<Totals> {
    let mut model = totals.clone();
    for op in batch {
        let accounts: &mut BTreeMap<String, Balance> = model.get_mut(&op.unit)?;
        let current = accounts.get(&op.key).copied().unwrap_or(0);
        let next = op.kind.apply(current).ok()?;
        accounts.insert(op.key.clone(), next);
    }
    Some(model)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestLedger;
    use tally_core::{is_valid_account_key, Ledger, LedgerError};

    fn load_totals(ledger: &Ledger, totals: &Totals) {
        for (unit, accounts) in totals {
            ledger.add_unit(*unit).unwrap();
            ledger
                .transaction(|tx| {
                    for (key, balance) in accounts {
                        tx.set(*unit, key, *balance)?;
                    }
                    Ok(())
                })
                .unwrap();
        }
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_keys_are_valid(key in account_key_strategy()) {
            prop_assert!(is_valid_account_key(&key));
        }

        #[test]
        fn save_then_load_reproduces_totals(totals in totals_strategy(6, 6)) {
            let fixture = TestLedger::open();
            load_totals(&fixture, &totals);

            let restored = fixture.save_and_reload();
            let mut expected = totals.clone();
            expected.retain(|_, accounts| !accounts.is_empty());
            let mut actual = restored.total().unwrap();
            actual.retain(|_, accounts| !accounts.is_empty());
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn commit_is_all_or_nothing(
            start in prop::collection::btree_map(0i64..3, prop::collection::btree_map(
                prop::sample::select(vec!["a".to_string(), "b".to_string()]), 0i64..100, 0..=2), 1..=3),
            batch in batch_strategy(4, 8),
        ) {
            let fixture = TestLedger::open();
            load_totals(&fixture, &start);

            let mut tx = fixture.begin();
            for op in &batch {
                match op.kind {
                    OperationKind::Credit(amount) => { tx.credit(op.unit, &op.key, amount).unwrap(); }
                    OperationKind::Debit(amount) => { tx.debit(op.unit, &op.key, amount).unwrap(); }
                    OperationKind::Set(value) => { tx.set(op.unit, &op.key, value).unwrap(); }
                }
            }
            let result = tx.commit();
            let after = fixture.total().unwrap();

            match model_commit(&start, &batch) {
                Some(expected) => {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(after, expected);
                }
                None => {
                    let is_validation_error =
                        matches!(result, Err(LedgerError::TransactionValidation { .. }));
                    prop_assert!(is_validation_error);
                    prop_assert_eq!(after, start);
                }
            }
        }
    }
}
