//! Atomic conditional multi-key stock update
//!
//! This is the concurrency-correctness backbone of fulfillment: every stock
//! mutation in the system goes through [`apply_stock_update`] inside a write
//! transaction. The function validates every requirement against the values
//! visible to that transaction before touching anything, so a failure leaves
//! the transaction clean to abandon, and a success applies every delta or
//! none (the caller commits or drops the transaction as a whole).
//!
//! Absence semantics are strict: a missing category or an untracked item is
//! a hard error, never "zero stock". Treating absence as zero would mask
//! drift between menu recipes and the inventory registry.

use super::storage::{CATEGORIES_TABLE, STOCK_TABLE, StorageError};
use redb::{ReadableTable, WriteTransaction};
use shared::models::IngredientKey;
use thiserror::Error;

/// One conditional update tuple: require at least `required_min`, then apply
/// `delta` (negative for deductions)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequirement {
    pub key: IngredientKey,
    pub required_min: u64,
    pub delta: i64,
}

impl StockRequirement {
    /// Deduction tuple for a fulfillment: require `needed`, deduct `needed`
    pub fn deduct(key: IngredientKey, needed: u64) -> Self {
        Self {
            key,
            required_min: needed,
            delta: -(needed as i64),
        }
    }

    /// Administrative adjustment tuple: no minimum, signed delta
    pub fn adjust(key: IngredientKey, delta: i64) -> Self {
        Self {
            key,
            required_min: 0,
            delta,
        }
    }
}

/// One applied change, for stock logging and API responses
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StockChange {
    pub key: IngredientKey,
    pub previous_value: u64,
    pub new_value: u64,
    pub delta: i64,
}

/// Stock update failures
///
/// Any error means the transaction applied nothing; the caller must drop it
/// without committing.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Inventory category not found: {0}")]
    CategoryNotFound(String),

    #[error("Item not tracked in inventory: {0}")]
    FieldNotTracked(IngredientKey),

    #[error("Insufficient stock for {key}: need {required}, have {available}")]
    InsufficientStock {
        key: IngredientKey,
        required: u64,
        available: u64,
    },

    #[error("Stock value out of range for {0}")]
    ValueOutOfRange(IngredientKey),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<redb::TableError> for StockError {
    fn from(e: redb::TableError) -> Self {
        Self::Storage(StorageError::Table(e))
    }
}

impl From<redb::StorageError> for StockError {
    fn from(e: redb::StorageError) -> Self {
        Self::Storage(StorageError::Storage(e))
    }
}

/// Validate and apply a set of conditional updates within one transaction
///
/// Two phases over the transaction's own view of the tables:
/// 1. read every referenced value, failing on the first missing category,
///    untracked item, value below its required minimum, or delta that would
///    take a value below zero;
/// 2. write every new value.
///
/// Requirements are processed in the order given, so error reporting is
/// deterministic for a deterministically ordered input.
pub fn apply_stock_update(
    txn: &WriteTransaction,
    requirements: &[StockRequirement],
) -> Result<Vec<StockChange>, StockError> {
    let categories = txn.open_table(CATEGORIES_TABLE)?;
    let mut stock = txn.open_table(STOCK_TABLE)?;

    // Phase 1: read and validate everything before writing anything
    let mut changes = Vec::with_capacity(requirements.len());
    for req in requirements {
        if categories.get(req.key.category.as_str())?.is_none() {
            return Err(StockError::CategoryNotFound(req.key.category.clone()));
        }

        let current = stock
            .get((req.key.category.as_str(), req.key.item.as_str()))?
            .map(|guard| guard.value())
            .ok_or_else(|| StockError::FieldNotTracked(req.key.clone()))?;

        if current < req.required_min {
            return Err(StockError::InsufficientStock {
                key: req.key.clone(),
                required: req.required_min,
                available: current,
            });
        }

        // Adjustment deltas are client-supplied; sum in i128 so the check
        // itself cannot overflow.
        let new_value = i128::from(current) + i128::from(req.delta);
        if new_value < 0 {
            // Reachable only via administrative adjustments (required_min = 0);
            // deduction tuples set required_min = -delta.
            return Err(StockError::InsufficientStock {
                key: req.key.clone(),
                required: req.delta.unsigned_abs(),
                available: current,
            });
        }
        // Stock stays within i64 so a later deduction delta can always
        // express draining it.
        if new_value > i128::from(i64::MAX) {
            return Err(StockError::ValueOutOfRange(req.key.clone()));
        }
        let new_value = new_value as u64;

        changes.push(StockChange {
            key: req.key.clone(),
            previous_value: current,
            new_value,
            delta: req.delta,
        });
    }

    // Phase 2: apply all deltas
    for change in &changes {
        stock.insert(
            (change.key.category.as_str(), change.key.item.as_str()),
            change.new_value,
        )?;
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::storage::PosStorage;
    use shared::models::InventorySeed;
    use std::collections::BTreeMap;

    fn storage_with_stock(entries: &[(&str, &str, u64)]) -> PosStorage {
        let mut seed = InventorySeed::new();
        for (category, item, quantity) in entries {
            seed.entry(category.to_string())
                .or_insert_with(BTreeMap::new)
                .insert(item.to_string(), *quantity);
        }
        let storage = PosStorage::open_in_memory().unwrap();
        storage.seed_inventory(&seed).unwrap();
        storage
    }

    fn key(s: &str) -> IngredientKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_deduction_applies_all_deltas() {
        let storage = storage_with_stock(&[
            ("consumables", "medium-cup", 5),
            ("consumables", "boba-straw", 5),
        ]);

        let txn = storage.begin_write().unwrap();
        let changes = apply_stock_update(
            &txn,
            &[
                StockRequirement::deduct(key("consumables/medium-cup"), 3),
                StockRequirement::deduct(key("consumables/boba-straw"), 3),
            ],
        )
        .unwrap();
        txn.commit().unwrap();

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].previous_value, 5);
        assert_eq!(changes[0].new_value, 2);
        assert_eq!(changes[0].delta, -3);
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(2)
        );
        assert_eq!(
            storage.stock_quantity("consumables", "boba-straw").unwrap(),
            Some(2)
        );
    }

    #[test]
    fn test_insufficient_stock_names_the_item() {
        let storage = storage_with_stock(&[("consumables", "medium-cup", 5)]);

        let txn = storage.begin_write().unwrap();
        let err = apply_stock_update(
            &txn,
            &[StockRequirement::deduct(key("consumables/medium-cup"), 10)],
        )
        .unwrap_err();
        drop(txn);

        match err {
            StockError::InsufficientStock {
                key,
                required,
                available,
            } => {
                assert_eq!(key.to_string(), "consumables/medium-cup");
                assert_eq!(required, 10);
                assert_eq!(available, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Nothing changed
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(5)
        );
    }

    #[test]
    fn test_partial_failure_applies_nothing() {
        let storage = storage_with_stock(&[
            ("consumables", "medium-cup", 5),
            ("consumables", "boba-straw", 1),
        ]);

        // First tuple is satisfiable, second is not
        let txn = storage.begin_write().unwrap();
        let err = apply_stock_update(
            &txn,
            &[
                StockRequirement::deduct(key("consumables/medium-cup"), 3),
                StockRequirement::deduct(key("consumables/boba-straw"), 3),
            ],
        )
        .unwrap_err();
        drop(txn);

        assert!(matches!(err, StockError::InsufficientStock { .. }));
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(5)
        );
        assert_eq!(
            storage.stock_quantity("consumables", "boba-straw").unwrap(),
            Some(1)
        );
    }

    #[test]
    fn test_missing_category_is_hard_error() {
        let storage = storage_with_stock(&[("consumables", "medium-cup", 5)]);

        let txn = storage.begin_write().unwrap();
        let err = apply_stock_update(
            &txn,
            &[StockRequirement::deduct(key("powders/taro-powder"), 1)],
        )
        .unwrap_err();
        drop(txn);

        assert!(matches!(err, StockError::CategoryNotFound(c) if c == "powders"));
    }

    #[test]
    fn test_untracked_item_is_not_zero_stock() {
        let storage = storage_with_stock(&[("consumables", "medium-cup", 5)]);

        let txn = storage.begin_write().unwrap();
        let err = apply_stock_update(
            &txn,
            &[StockRequirement::deduct(key("consumables/large-cup"), 1)],
        )
        .unwrap_err();
        drop(txn);

        assert!(
            matches!(err, StockError::FieldNotTracked(k) if k.to_string() == "consumables/large-cup")
        );
    }

    #[test]
    fn test_adjustment_can_restock() {
        let storage = storage_with_stock(&[("consumables", "medium-cup", 5)]);

        let txn = storage.begin_write().unwrap();
        let changes = apply_stock_update(
            &txn,
            &[StockRequirement::adjust(key("consumables/medium-cup"), 20)],
        )
        .unwrap();
        txn.commit().unwrap();

        assert_eq!(changes[0].new_value, 25);
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(25)
        );
    }

    #[test]
    fn test_adjustment_cannot_go_below_zero() {
        let storage = storage_with_stock(&[("consumables", "medium-cup", 5)]);

        let txn = storage.begin_write().unwrap();
        let err = apply_stock_update(
            &txn,
            &[StockRequirement::adjust(key("consumables/medium-cup"), -6)],
        )
        .unwrap_err();
        drop(txn);

        assert!(matches!(err, StockError::InsufficientStock { .. }));
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(5)
        );
    }

    #[test]
    fn test_adjustment_overflow_is_rejected() {
        let storage = storage_with_stock(&[("consumables", "medium-cup", 5)]);

        let txn = storage.begin_write().unwrap();
        let err = apply_stock_update(
            &txn,
            &[StockRequirement::adjust(
                key("consumables/medium-cup"),
                i64::MAX,
            )],
        )
        .unwrap_err();
        drop(txn);

        assert!(
            matches!(err, StockError::ValueOutOfRange(k) if k.to_string() == "consumables/medium-cup")
        );
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(5)
        );
    }

    #[test]
    fn test_deduction_to_exactly_zero_succeeds() {
        let storage = storage_with_stock(&[("consumables", "medium-cup", 3)]);

        let txn = storage.begin_write().unwrap();
        apply_stock_update(
            &txn,
            &[StockRequirement::deduct(key("consumables/medium-cup"), 3)],
        )
        .unwrap();
        txn.commit().unwrap();

        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(0)
        );
    }
}
