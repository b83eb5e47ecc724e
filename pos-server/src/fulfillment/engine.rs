//! Fulfillment engine - order intake, stock deduction, and the order ledger
//!
//! The engine composes the catalog and the store into the transactional
//! workflow: validate the cart against the menu, aggregate ingredient needs
//! across all lines, then deduct stock and record the order inside a single
//! write transaction. Rejections leave the store byte-identical to before
//! the attempt because the transaction is dropped uncommitted.

use super::error::{EngineError, EngineResult};
use super::inventory::{StockChange, StockError, StockRequirement, apply_stock_update};
use super::storage::{PosStorage, StorageError};
use crate::catalog::{IndexedRecipe, RecipeCatalog};
use chrono::Utc;
use redb::WriteTransaction;
use shared::models::{IngredientKey, StockLogEntry, StockLogReason};
use shared::order::{CartLine, FulfillmentResponse, Order, OrderAddon, OrderItem, OrderStatus};
use std::sync::Arc;
use tracing::{info, warn};

/// Receipt numbers start counting from here so they stay fixed-width
const RECEIPT_BASE: u64 = 10_000;

/// Order fulfillment engine
#[derive(Clone)]
pub struct FulfillmentEngine {
    storage: PosStorage,
    catalog: Arc<RecipeCatalog>,
}

impl FulfillmentEngine {
    pub fn new(storage: PosStorage, catalog: Arc<RecipeCatalog>) -> Self {
        Self { storage, catalog }
    }

    /// Take a cart, deduct stock, and record the completed order atomically
    ///
    /// This is the front-counter path: the order only ever exists in the
    /// store as Completed, written in the same transaction that deducts its
    /// ingredients.
    pub async fn place_and_fulfill(
        &self,
        cart: &[CartLine],
        operator: Option<&str>,
    ) -> FulfillmentResponse {
        match self.try_place_and_fulfill(cart, operator) {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    receipt = %order.receipt_number,
                    total = order.total,
                    "Order fulfilled"
                );
                FulfillmentResponse::fulfilled(order.id)
            }
            Err(err) => {
                self.record_rejection(&err, operator);
                err.into()
            }
        }
    }

    fn try_place_and_fulfill(
        &self,
        cart: &[CartLine],
        operator: Option<&str>,
    ) -> EngineResult<Order> {
        // Cart and catalog validation happens before any store access
        let (items, total) = self.build_items(cart)?;
        let requirements = self.aggregate(cart)?;

        let mut order = self.new_order(items, total, operator)?;
        order.status = OrderStatus::Completed;
        order.completed_at = Some(Utc::now().timestamp_millis());

        let txn = self.storage.begin_write()?;
        self.deduct_and_log(&txn, &requirements, &order.id, operator)?;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        Ok(order)
    }

    /// Record a pending order without touching stock
    ///
    /// Used for pre-orders: the stock check and deduction happen at
    /// [`Self::fulfill_order`] time, not here.
    pub async fn place_order(
        &self,
        cart: &[CartLine],
        operator: Option<&str>,
    ) -> EngineResult<Order> {
        let (items, total) = self.build_items(cart)?;
        let order = self.new_order(items, total, operator)?;

        let txn = self.storage.begin_write()?;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        info!(
            order_id = %order.id,
            receipt = %order.receipt_number,
            "Order placed (pending)"
        );
        Ok(order)
    }

    /// Deduct stock for a pending order and mark it completed
    ///
    /// The status check runs inside the write transaction, so a concurrent
    /// fulfillment of the same order cannot deduct twice: the second caller
    /// observes the committed Completed status and is rejected.
    pub async fn fulfill_order(
        &self,
        order_id: &str,
        operator: Option<&str>,
    ) -> FulfillmentResponse {
        match self.try_fulfill_order(order_id, operator) {
            Ok(order) => {
                info!(
                    order_id = %order.id,
                    receipt = %order.receipt_number,
                    "Pending order fulfilled"
                );
                FulfillmentResponse::fulfilled(order.id)
            }
            Err(err) => {
                self.record_rejection(&err, operator);
                err.into()
            }
        }
    }

    fn try_fulfill_order(&self, order_id: &str, operator: Option<&str>) -> EngineResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)
            .map_err(map_order_lookup)?;

        if order.status != OrderStatus::Pending {
            return Err(EngineError::InvalidState {
                order_id: order.id,
                status: order.status,
            });
        }

        let requirements = self.aggregate_items(&order.items)?;
        self.deduct_and_log(&txn, &requirements, &order.id, operator)?;

        order.status = OrderStatus::Completed;
        order.completed_at = Some(Utc::now().timestamp_millis());
        if operator.is_some() {
            order.operator = operator.map(str::to_string);
        }
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        Ok(order)
    }

    /// Cancel a pending order (customer walked away, no stock was deducted)
    pub async fn cancel_order(&self, order_id: &str) -> EngineResult<Order> {
        self.transition(order_id, OrderStatus::Cancelled)
    }

    /// Void a pending order (operator correction)
    pub async fn void_order(&self, order_id: &str) -> EngineResult<Order> {
        self.transition(order_id, OrderStatus::Voided)
    }

    fn transition(&self, order_id: &str, target: OrderStatus) -> EngineResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)
            .map_err(map_order_lookup)?;

        if order.status != OrderStatus::Pending {
            return Err(EngineError::InvalidState {
                order_id: order.id,
                status: order.status,
            });
        }

        order.status = target;
        self.storage.store_order(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        info!(order_id = %order.id, status = ?order.status, "Order transitioned");
        Ok(order)
    }

    /// Apply manual stock adjustments (restock, spoilage, correction)
    ///
    /// Every adjustment is validated and logged in one transaction; an
    /// adjustment that would take any quantity below zero rejects the whole
    /// batch.
    pub async fn adjust_stock(
        &self,
        adjustments: &[StockRequirement],
        user: Option<&str>,
    ) -> EngineResult<Vec<StockChange>> {
        let txn = self.storage.begin_write()?;
        let changes = apply_stock_update(&txn, adjustments)?;

        let now = Utc::now().timestamp_millis();
        for change in &changes {
            let entry = log_entry(change, StockLogReason::ManualAdjustment, None, user, now);
            self.storage.append_stock_log(&txn, &entry)?;
        }
        txn.commit().map_err(StorageError::from)?;

        info!(adjustments = changes.len(), "Stock adjusted manually");
        Ok(changes)
    }

    // ========== Internals ==========

    /// Build priced order items from the cart, validating against the menu
    fn build_items(&self, cart: &[CartLine]) -> EngineResult<(Vec<OrderItem>, i64)> {
        if cart.is_empty() {
            return Err(EngineError::EmptyCart);
        }

        let mut items = Vec::with_capacity(cart.len());
        let mut total = 0i64;
        for line in cart {
            if line.quantity == 0 {
                return Err(EngineError::ZeroQuantity {
                    product_id: line.product_id.clone(),
                });
            }
            let product = self.catalog.product(&line.product_id, &line.size)?;

            let mut addons = Vec::with_capacity(line.addons.len());
            let mut unit_price = product.price;
            for addon_id in &line.addons {
                let addon = self.catalog.addon(addon_id)?;
                unit_price += addon.price;
                addons.push(OrderAddon {
                    id: addon.id.clone(),
                    name: addon.name.clone(),
                    price: addon.price,
                });
            }

            let line_total = unit_price * i64::from(line.quantity);
            total += line_total;
            items.push(OrderItem {
                product_id: line.product_id.clone(),
                name: product.name.clone(),
                size: line.size.clone(),
                sugar: line.sugar.clone(),
                ice: line.ice.clone(),
                addons,
                quantity: line.quantity,
                unit_price,
                line_total,
            });
        }
        Ok((items, total))
    }

    /// Sum ingredient needs across every cart line and addon
    ///
    /// Aggregating before the transaction means an ingredient shared by
    /// several lines is checked once against its total need, not
    /// line-by-line. Requirements keep first-reference order (recipe
    /// declaration order within a line), so a shortage report names the
    /// first short ingredient as the menu lists it.
    fn aggregate(&self, cart: &[CartLine]) -> EngineResult<Vec<StockRequirement>> {
        let mut needs: Vec<(IngredientKey, u64)> = Vec::new();
        for line in cart {
            let quantity = u64::from(line.quantity);
            let product = self.catalog.product(&line.product_id, &line.size)?;
            accumulate(&mut needs, &product.recipe, quantity);
            for addon_id in &line.addons {
                let addon = self.catalog.addon(addon_id)?;
                accumulate(&mut needs, &addon.recipe, quantity);
            }
        }
        Ok(into_deductions(needs))
    }

    /// Same aggregation, driven by the stored items of a pending order
    fn aggregate_items(&self, items: &[OrderItem]) -> EngineResult<Vec<StockRequirement>> {
        let mut needs: Vec<(IngredientKey, u64)> = Vec::new();
        for item in items {
            let quantity = u64::from(item.quantity);
            let product = self.catalog.product(&item.product_id, &item.size)?;
            accumulate(&mut needs, &product.recipe, quantity);
            for addon in &item.addons {
                let addon = self.catalog.addon(&addon.id)?;
                accumulate(&mut needs, &addon.recipe, quantity);
            }
        }
        Ok(into_deductions(needs))
    }

    fn new_order(
        &self,
        items: Vec<OrderItem>,
        total: i64,
        operator: Option<&str>,
    ) -> EngineResult<Order> {
        let count = self.storage.next_order_count()?;
        let now = Utc::now();
        Ok(Order {
            id: uuid::Uuid::new_v4().to_string(),
            receipt_number: format!("BBT{}{}", now.format("%Y%m%d"), RECEIPT_BASE + count),
            items,
            total,
            status: OrderStatus::Pending,
            created_at: now.timestamp_millis(),
            completed_at: None,
            operator: operator.map(str::to_string),
        })
    }

    /// Deduct stock and write one log entry per changed ingredient,
    /// all within the caller's transaction
    fn deduct_and_log(
        &self,
        txn: &WriteTransaction,
        requirements: &[StockRequirement],
        order_id: &str,
        operator: Option<&str>,
    ) -> EngineResult<Vec<StockChange>> {
        let changes = apply_stock_update(txn, requirements)?;
        let now = Utc::now().timestamp_millis();
        for change in &changes {
            let entry = log_entry(
                change,
                StockLogReason::OrderFulfilled,
                Some(order_id),
                operator,
                now,
            );
            self.storage.append_stock_log(txn, &entry)?;
        }
        Ok(changes)
    }

    /// Record why an attempt was rejected
    ///
    /// Insufficient-stock rejections get a stock log entry so the shortage
    /// shows up in the audit trail; the log write is best-effort because the
    /// rejection itself already stands.
    fn record_rejection(&self, err: &EngineError, operator: Option<&str>) {
        warn!(error = %err, code = ?err.code(), "Order rejected");

        if let EngineError::Stock(StockError::InsufficientStock {
            key,
            required,
            available,
        }) = err
        {
            let entry = StockLogEntry {
                sequence: 0,
                category: key.category.clone(),
                item: key.item.clone(),
                previous_value: *available,
                new_value: *available,
                delta: 0,
                reason: StockLogReason::OrderFailedInsufficientStock,
                order_id: None,
                user: operator.map(str::to_string),
                timestamp: Utc::now().timestamp_millis(),
            };
            if let Err(log_err) = self.storage.append_stock_log_standalone(&entry) {
                warn!(
                    error = %log_err,
                    key = %key,
                    required,
                    "Failed to record rejected fulfillment attempt"
                );
            }
        }
    }
}

impl std::fmt::Debug for FulfillmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FulfillmentEngine").finish_non_exhaustive()
    }
}

fn accumulate(needs: &mut Vec<(IngredientKey, u64)>, recipe: &IndexedRecipe, multiplier: u64) {
    for (key, per_unit) in recipe {
        match needs.iter_mut().find(|(k, _)| *k == *key) {
            Some((_, total)) => *total += per_unit * multiplier,
            None => needs.push((key.clone(), per_unit * multiplier)),
        }
    }
}

fn into_deductions(needs: Vec<(IngredientKey, u64)>) -> Vec<StockRequirement> {
    needs
        .into_iter()
        .map(|(key, needed)| StockRequirement::deduct(key, needed))
        .collect()
}

fn log_entry(
    change: &StockChange,
    reason: StockLogReason,
    order_id: Option<&str>,
    user: Option<&str>,
    timestamp: i64,
) -> StockLogEntry {
    StockLogEntry {
        sequence: 0,
        category: change.key.category.clone(),
        item: change.key.item.clone(),
        previous_value: change.previous_value,
        new_value: change.new_value,
        delta: change.delta,
        reason,
        order_id: order_id.map(str::to_string),
        user: user.map(str::to_string),
        timestamp,
    }
}

fn map_order_lookup(err: StorageError) -> EngineError {
    match err {
        StorageError::OrderNotFound(id) => EngineError::OrderNotFound(id),
        other => EngineError::Storage(other),
    }
}
