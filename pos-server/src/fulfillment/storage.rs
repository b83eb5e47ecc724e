//! redb-based storage layer for inventory, orders, and stock logs
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `categories` | `category` | `()` | Category registry (existence check) |
//! | `stock` | `(category, item)` | `u64` | Current stock quantities |
//! | `orders` | `order_id` | `Order` (JSON) | Order ledger |
//! | `stock_logs` | `sequence` | `StockLogEntry` (JSON) | Append-only audit log |
//! | `counters` | `"log_seq"` / `"order_count"` | `u64` | Monotonic counters |
//!
//! # Isolation
//!
//! redb allows a single write transaction at a time; writers serialize and
//! each commit is atomic. That property is what makes the conditional
//! multi-key stock update in [`super::inventory`] safe under concurrent
//! fulfillments: two orders competing for the same item cannot both observe
//! the same stale quantity.
//!
//! # Durability
//!
//! Commits are persistent as soon as `commit()` returns (copy-on-write with
//! atomic pointer swap), so a crash mid-fulfillment leaves either the fully
//! applied order or nothing.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::models::{CategorySnapshot, InventorySeed, StockLogEntry};
use shared::order::{Order, OrderStatus};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Category registry: key = category name, value = empty (existence check)
pub(super) const CATEGORIES_TABLE: TableDefinition<&str, ()> = TableDefinition::new("categories");

/// Stock quantities: key = (category, item), value = quantity
pub(super) const STOCK_TABLE: TableDefinition<(&str, &str), u64> = TableDefinition::new("stock");

/// Order ledger: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Stock audit log: key = sequence, value = JSON-serialized StockLogEntry
const STOCK_LOG_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("stock_logs");

/// Counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const LOG_SEQ_KEY: &str = "log_seq";
const ORDER_COUNT_KEY: &str = "order_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// POS storage backed by redb
#[derive(Clone)]
pub struct PosStorage {
    db: Arc<Database>,
}

impl PosStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(CATEGORIES_TABLE)?;
            let _ = write_txn.open_table(STOCK_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(STOCK_LOG_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(LOG_SEQ_KEY)?.is_none() {
                counters.insert(LOG_SEQ_KEY, 0u64)?;
            }
            if counters.get(ORDER_COUNT_KEY)?.is_none() {
                counters.insert(ORDER_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// All mutations compose inside one transaction: stock deduction, order
    /// write, and stock-log append either all commit or none do.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Inventory Seeding ==========

    /// Register categories and items from the seed on first start
    ///
    /// A non-empty category registry makes this a no-op, so re-running the
    /// server never resets quantities. Returns whether seeding happened.
    pub fn seed_inventory(&self, seed: &InventorySeed) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let seeded = {
            let mut categories = txn.open_table(CATEGORIES_TABLE)?;
            if !categories.is_empty()? {
                false
            } else {
                let mut stock = txn.open_table(STOCK_TABLE)?;
                for (category, items) in seed {
                    categories.insert(category.as_str(), ())?;
                    for (item, quantity) in items {
                        stock.insert((category.as_str(), item.as_str()), *quantity)?;
                    }
                }
                true
            }
        };
        txn.commit()?;
        if seeded {
            tracing::info!(categories = seed.len(), "Inventory seeded from config");
        }
        Ok(seeded)
    }

    // ========== Inventory Reads (display only) ==========

    /// Snapshot all categories with their item quantities
    pub fn list_inventory(&self) -> StorageResult<Vec<CategorySnapshot>> {
        let read_txn = self.db.begin_read()?;
        let categories = read_txn.open_table(CATEGORIES_TABLE)?;
        let stock = read_txn.open_table(STOCK_TABLE)?;

        let mut by_category: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for result in categories.iter()? {
            let (key, _) = result?;
            by_category.insert(key.value().to_string(), BTreeMap::new());
        }
        for result in stock.iter()? {
            let (key, value) = result?;
            let (category, item) = key.value();
            by_category
                .entry(category.to_string())
                .or_default()
                .insert(item.to_string(), value.value());
        }

        Ok(by_category
            .into_iter()
            .map(|(category, items)| CategorySnapshot { category, items })
            .collect())
    }

    /// Current quantity of one item, for display
    pub fn stock_quantity(&self, category: &str, item: &str) -> StorageResult<Option<u64>> {
        let read_txn = self.db.begin_read()?;
        let stock = read_txn.open_table(STOCK_TABLE)?;
        Ok(stock.get((category, item))?.map(|guard| guard.value()))
    }

    // ========== Order Operations ==========

    /// Store an order (insert or overwrite) within a transaction
    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Load an order within a write transaction
    ///
    /// Status checks must read through the write transaction, not a separate
    /// read snapshot, or a concurrent completion could slip between check
    /// and update.
    pub fn get_order_txn(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<Order> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let guard = table
            .get(order_id)?
            .ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// Load an order (read-only)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Order> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let guard = table
            .get(order_id)?
            .ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// List orders newest-first, optionally filtered by status
    pub fn list_orders(&self, status: Option<OrderStatus>) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if status.is_none_or(|s| order.status == s) {
                orders.push(order);
            }
        }
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    // ========== Order Counter (for receipt numbers) ==========

    /// Get and increment the order count atomically
    ///
    /// Returns the NEW count after increment. Crash-safe: the counter lives
    /// in redb, so restarts never reuse a receipt number.
    pub fn next_order_count(&self) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let next = {
            let mut counters = txn.open_table(COUNTERS_TABLE)?;
            let current = counters
                .get(ORDER_COUNT_KEY)?
                .map(|g| g.value())
                .unwrap_or(0);
            let next = current + 1;
            counters.insert(ORDER_COUNT_KEY, next)?;
            next
        };
        txn.commit()?;
        Ok(next)
    }

    // ========== Stock Log ==========

    /// Append a stock log entry within a transaction
    ///
    /// Assigns and returns the entry's global sequence number.
    pub fn append_stock_log(
        &self,
        txn: &WriteTransaction,
        entry: &StockLogEntry,
    ) -> StorageResult<u64> {
        let sequence = {
            let mut counters = txn.open_table(COUNTERS_TABLE)?;
            let next = counters.get(LOG_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0) + 1;
            counters.insert(LOG_SEQ_KEY, next)?;
            next
        };

        let mut table = txn.open_table(STOCK_LOG_TABLE)?;
        let mut entry = entry.clone();
        entry.sequence = sequence;
        let value = serde_json::to_vec(&entry)?;
        table.insert(sequence, value.as_slice())?;
        Ok(sequence)
    }

    /// Append a stock log entry in its own transaction
    ///
    /// Used for recording rejected fulfillment attempts, which by definition
    /// happen after their transaction was abandoned.
    pub fn append_stock_log_standalone(&self, entry: &StockLogEntry) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let sequence = self.append_stock_log(&txn, entry)?;
        txn.commit()?;
        Ok(sequence)
    }

    /// List stock log entries newest-first
    pub fn list_stock_logs(&self, limit: usize) -> StorageResult<Vec<StockLogEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STOCK_LOG_TABLE)?;

        let mut entries = Vec::new();
        for result in table.iter()?.rev() {
            if entries.len() >= limit {
                break;
            }
            let (_, value) = result?;
            let entry: StockLogEntry = serde_json::from_slice(value.value())?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Number of stock log entries (test observability)
    #[cfg(test)]
    pub fn stock_log_len(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STOCK_LOG_TABLE)?;
        Ok(table.len()?)
    }

    /// Number of recorded orders (test observability)
    #[cfg(test)]
    pub fn order_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.len()?)
    }
}

impl std::fmt::Debug for PosStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::StockLogReason;

    fn seed() -> InventorySeed {
        let mut seed = InventorySeed::new();
        seed.insert(
            "consumables".to_string(),
            BTreeMap::from([
                ("medium-cup".to_string(), 5u64),
                ("sealing-film".to_string(), 5u64),
                ("boba-straw".to_string(), 5u64),
            ]),
        );
        seed.insert(
            "toppings".to_string(),
            BTreeMap::from([("pearl".to_string(), 10u64)]),
        );
        seed
    }

    fn test_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            receipt_number: "BBT2026083010001".to_string(),
            items: vec![],
            total: 0,
            status: OrderStatus::Pending,
            created_at: 1_700_000_000_000,
            completed_at: None,
            operator: None,
        }
    }

    #[test]
    fn test_seed_registers_categories_and_items() {
        let storage = PosStorage::open_in_memory().unwrap();
        assert!(storage.seed_inventory(&seed()).unwrap());

        let snapshot = storage.list_inventory().unwrap();
        assert_eq!(snapshot.len(), 2);
        let consumables = &snapshot[0];
        assert_eq!(consumables.category, "consumables");
        assert_eq!(consumables.items["medium-cup"], 5);
        assert_eq!(
            storage.stock_quantity("toppings", "pearl").unwrap(),
            Some(10)
        );
    }

    #[test]
    fn test_seed_is_idempotent() {
        let storage = PosStorage::open_in_memory().unwrap();
        assert!(storage.seed_inventory(&seed()).unwrap());

        // Mutate a quantity, then seed again: must not reset
        let txn = storage.begin_write().unwrap();
        {
            let mut stock = txn.open_table(STOCK_TABLE).unwrap();
            stock.insert(("consumables", "medium-cup"), 2u64).unwrap();
        }
        txn.commit().unwrap();

        assert!(!storage.seed_inventory(&seed()).unwrap());
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(2)
        );
    }

    #[test]
    fn test_order_roundtrip() {
        let storage = PosStorage::open_in_memory().unwrap();
        let order = test_order("order-1");

        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        let loaded = storage.get_order("order-1").unwrap();
        assert_eq!(loaded.id, "order-1");
        assert_eq!(loaded.status, OrderStatus::Pending);

        assert!(matches!(
            storage.get_order("missing").unwrap_err(),
            StorageError::OrderNotFound(_)
        ));
    }

    #[test]
    fn test_list_orders_filters_and_sorts() {
        let storage = PosStorage::open_in_memory().unwrap();

        let mut first = test_order("order-1");
        first.created_at = 100;
        let mut second = test_order("order-2");
        second.created_at = 200;
        second.status = OrderStatus::Completed;

        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &first).unwrap();
        storage.store_order(&txn, &second).unwrap();
        txn.commit().unwrap();

        let all = storage.list_orders(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "order-2"); // newest first

        let pending = storage.list_orders(Some(OrderStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "order-1");
    }

    #[test]
    fn test_order_counter_is_monotonic() {
        let storage = PosStorage::open_in_memory().unwrap();
        assert_eq!(storage.next_order_count().unwrap(), 1);
        assert_eq!(storage.next_order_count().unwrap(), 2);
        assert_eq!(storage.next_order_count().unwrap(), 3);
    }

    #[test]
    fn test_stock_log_sequence_and_listing() {
        let storage = PosStorage::open_in_memory().unwrap();

        let entry = StockLogEntry {
            sequence: 0,
            category: "consumables".to_string(),
            item: "medium-cup".to_string(),
            previous_value: 5,
            new_value: 3,
            delta: -2,
            reason: StockLogReason::OrderFulfilled,
            order_id: Some("order-1".to_string()),
            user: Some("alice".to_string()),
            timestamp: 1_700_000_000_000,
        };

        let txn = storage.begin_write().unwrap();
        let seq1 = storage.append_stock_log(&txn, &entry).unwrap();
        let seq2 = storage.append_stock_log(&txn, &entry).unwrap();
        txn.commit().unwrap();
        assert_eq!((seq1, seq2), (1, 2));

        let seq3 = storage.append_stock_log_standalone(&entry).unwrap();
        assert_eq!(seq3, 3);

        let logs = storage.list_stock_logs(10).unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].sequence, 3); // newest first

        let limited = storage.list_stock_logs(2).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_abandoned_transaction_leaves_no_trace() {
        let storage = PosStorage::open_in_memory().unwrap();
        storage.seed_inventory(&seed()).unwrap();

        {
            let txn = storage.begin_write().unwrap();
            storage.store_order(&txn, &test_order("order-x")).unwrap();
            // dropped without commit
            drop(txn);
        }

        assert_eq!(storage.order_count().unwrap(), 0);
    }

    #[test]
    fn test_on_disk_reopen_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.redb");

        {
            let storage = PosStorage::open(&path).unwrap();
            storage.seed_inventory(&seed()).unwrap();
            assert_eq!(storage.next_order_count().unwrap(), 1);
        }

        let storage = PosStorage::open(&path).unwrap();
        assert_eq!(
            storage.stock_quantity("consumables", "medium-cup").unwrap(),
            Some(5)
        );
        assert_eq!(storage.next_order_count().unwrap(), 2);
    }
}
