//! Shared order and fulfillment types

use serde::{Deserialize, Serialize};

// ============================================================================
// Order Status
// ============================================================================

/// Order lifecycle status
///
/// Transitions form a one-way DAG: `Pending` may move to exactly one of the
/// terminal states. Terminal orders are immutable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Recorded, not yet fulfilled; no stock has been deducted
    #[default]
    Pending,
    /// Fulfilled; stock was deducted exactly once
    Completed,
    /// Cancelled by an operator before fulfillment
    Cancelled,
    /// Voided by an operator (loss settlement, mistake, etc.)
    Voided,
}

impl OrderStatus {
    /// Whether this status is terminal (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

// ============================================================================
// Cart Input
// ============================================================================

/// One line of a customer's cart, as submitted by the client shell
///
/// Prices are intentionally absent: the engine derives them from the menu so
/// clients cannot submit stale or forged amounts. Sugar and ice options are
/// opaque strings with no inventory effect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice: Option<String>,
    /// Addon ids; duplicates mean double portions
    #[serde(default)]
    pub addons: Vec<String>,
    pub quantity: u32,
}

// ============================================================================
// Persisted Order
// ============================================================================

/// Addon snapshot on a recorded order item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderAddon {
    pub id: String,
    pub name: String,
    /// Price in cents at order time
    pub price: i64,
}

/// One item line of a recorded order (snapshot, never re-priced)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice: Option<String>,
    #[serde(default)]
    pub addons: Vec<OrderAddon>,
    pub quantity: u32,
    /// Per-unit price in cents, including addons
    pub unit_price: i64,
    /// `unit_price * quantity`, in cents
    pub line_total: i64,
}

/// Recorded order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Human-facing daily receipt number
    pub receipt_number: String,
    pub items: Vec<OrderItem>,
    /// Total in cents
    pub total: i64,
    pub status: OrderStatus,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    /// Set when the order reaches a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Operator attribution from the request session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

// ============================================================================
// Fulfillment Contract
// ============================================================================

/// Public error kinds surfaced to the client shell
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentErrorCode {
    /// Cart has no lines; nothing to fulfill
    EmptyCart,
    /// A product/size or addon has no recipe in the catalog
    UnknownRecipe,
    /// Not enough stock for one or more ingredients
    InsufficientStock,
    /// A recipe references a category the store does not have
    CategoryNotFound,
    /// A recipe references an item its category does not track
    FieldNotTracked,
    /// The order is not in a state that allows this operation
    InvalidState,
    /// Transient store failure; the operation is safe to retry
    StoreUnavailable,
}

impl FulfillmentErrorCode {
    /// Map to the unified [`ErrorCode`] space (HTTP status, categories)
    pub fn error_code(&self) -> crate::error::ErrorCode {
        use crate::error::ErrorCode;
        match self {
            Self::EmptyCart => ErrorCode::EmptyCart,
            Self::UnknownRecipe => ErrorCode::UnknownRecipe,
            Self::InsufficientStock => ErrorCode::InsufficientStock,
            Self::CategoryNotFound => ErrorCode::InventoryCategoryNotFound,
            Self::FieldNotTracked => ErrorCode::ItemNotTracked,
            Self::InvalidState => ErrorCode::InvalidOrderState,
            Self::StoreUnavailable => ErrorCode::StoreUnavailable,
        }
    }
}

/// Structured fulfillment failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FulfillmentError {
    pub code: FulfillmentErrorCode,
    pub message: String,
}

impl FulfillmentError {
    pub fn new(code: FulfillmentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result of a fulfillment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// The affected order id (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FulfillmentError>,
}

impl FulfillmentResponse {
    pub fn fulfilled(order_id: String) -> Self {
        Self {
            success: true,
            order_id: Some(order_id),
            error: None,
        }
    }

    pub fn rejected(error: FulfillmentError) -> Self {
        Self {
            success: false,
            order_id: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Voided.is_terminal());
    }

    #[test]
    fn test_error_code_wire_format() {
        let json = serde_json::to_string(&FulfillmentErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "\"INSUFFICIENT_STOCK\"");
        let json = serde_json::to_string(&FulfillmentErrorCode::FieldNotTracked).unwrap();
        assert_eq!(json, "\"FIELD_NOT_TRACKED\"");
    }

    #[test]
    fn test_response_shapes() {
        let ok = FulfillmentResponse::fulfilled("order-1".to_string());
        assert!(ok.success);
        assert_eq!(ok.order_id.as_deref(), Some("order-1"));
        assert!(ok.error.is_none());

        let err = FulfillmentResponse::rejected(FulfillmentError::new(
            FulfillmentErrorCode::EmptyCart,
            "Cart is empty",
        ));
        assert!(!err.success);
        assert!(err.order_id.is_none());
        assert_eq!(err.error.unwrap().code, FulfillmentErrorCode::EmptyCart);
    }

    #[test]
    fn test_cart_line_defaults() {
        let line: CartLine = serde_json::from_str(
            r#"{ "product_id": "mt-taro", "size": "medium", "quantity": 2 }"#,
        )
        .unwrap();
        assert!(line.addons.is_empty());
        assert!(line.sugar.is_none());
    }
}
