//! Stock audit log types
//!
//! Every stock mutation produces one entry per touched item, written in the
//! same transaction as the mutation itself. Failed fulfillment attempts are
//! recorded best-effort after the fact (the failed transaction left no
//! changes to document, only the rejection).

use serde::{Deserialize, Serialize};

/// Why a stock quantity changed (or failed to)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLogReason {
    /// Deducted as part of a completed order
    OrderFulfilled,
    /// Administrative stock edit
    ManualAdjustment,
    /// Fulfillment attempt rejected for lack of stock (no quantity change)
    OrderFailedInsufficientStock,
}

/// One audit entry for one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLogEntry {
    /// Global append sequence, assigned by the store
    pub sequence: u64,
    pub category: String,
    pub item: String,
    /// Quantity before the change (equal to `new_value` for failed attempts)
    pub previous_value: u64,
    /// Quantity after the change
    pub new_value: u64,
    /// Signed change applied (zero for failed attempts)
    pub delta: i64,
    pub reason: StockLogReason,
    /// Order that caused the change, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Operator attribution from the request session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}
