//! Engine errors and their translation to the public fulfillment contract

use super::inventory::StockError;
use super::storage::StorageError;
use crate::catalog::CatalogError;
use shared::order::{FulfillmentError, FulfillmentErrorCode, FulfillmentResponse, OrderStatus};
use thiserror::Error;

/// Engine-internal errors
///
/// Every variant guarantees zero inventory mutation: input and catalog
/// errors are raised before any store access, and stock/storage errors mean
/// the write transaction was dropped uncommitted.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Cart line for {product_id} has zero quantity")]
    ZeroQuantity { product_id: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {order_id} is {status:?}, expected Pending")]
    InvalidState {
        order_id: String,
        status: OrderStatus,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Public error kind for the client shell
    pub fn code(&self) -> FulfillmentErrorCode {
        match self {
            Self::EmptyCart | Self::ZeroQuantity { .. } => FulfillmentErrorCode::EmptyCart,
            Self::Catalog(_) => FulfillmentErrorCode::UnknownRecipe,
            Self::Stock(StockError::CategoryNotFound(_)) => FulfillmentErrorCode::CategoryNotFound,
            Self::Stock(StockError::FieldNotTracked(_)) => FulfillmentErrorCode::FieldNotTracked,
            // Fulfillment deltas are always negative, so a range overflow can
            // only come from a restock that large; report it as a stock
            // problem for the closed public code set.
            Self::Stock(StockError::InsufficientStock { .. })
            | Self::Stock(StockError::ValueOutOfRange(_)) => {
                FulfillmentErrorCode::InsufficientStock
            }
            Self::Stock(StockError::Storage(_)) => FulfillmentErrorCode::StoreUnavailable,
            Self::OrderNotFound(_) | Self::InvalidState { .. } => {
                FulfillmentErrorCode::InvalidState
            }
            Self::Storage(_) => FulfillmentErrorCode::StoreUnavailable,
        }
    }

    /// Translate to the structured error surfaced over the API
    pub fn to_fulfillment_error(&self) -> FulfillmentError {
        // Data-integrity errors signal configuration drift between the menu
        // and the inventory registry; surface them loudly.
        match self {
            Self::Stock(StockError::CategoryNotFound(category)) => {
                tracing::error!(category = %category, "Recipe references a missing inventory category");
            }
            Self::Stock(StockError::FieldNotTracked(key)) => {
                tracing::error!(key = %key, "Recipe references an untracked inventory item");
            }
            Self::Stock(StockError::Storage(e)) | Self::Storage(e) => {
                tracing::error!(error = %e, "Storage error during fulfillment");
            }
            _ => {}
        }
        FulfillmentError::new(self.code(), self.to_string())
    }
}

impl From<EngineError> for FulfillmentResponse {
    fn from(err: EngineError) -> Self {
        FulfillmentResponse::rejected(err.to_fulfillment_error())
    }
}

impl From<EngineError> for shared::AppError {
    fn from(err: EngineError) -> Self {
        match &err {
            // A client-supplied adjustment delta pushed a value out of range;
            // that is bad input, not a stock shortage.
            EngineError::Stock(StockError::ValueOutOfRange(_)) => {
                shared::AppError::validation(err.to_string())
            }
            _ => shared::AppError::with_message(err.code().error_code(), err.to_string()),
        }
    }
}

impl From<StorageError> for shared::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OrderNotFound(id) => {
                shared::AppError::not_found(format!("Order {id}"))
            }
            other => shared::AppError::database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::IngredientKey;

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(EngineError::EmptyCart.code(), FulfillmentErrorCode::EmptyCart);
        assert_eq!(
            EngineError::Catalog(CatalogError::UnknownProduct("mt-unicorn".to_string())).code(),
            FulfillmentErrorCode::UnknownRecipe
        );
        assert_eq!(
            EngineError::Stock(StockError::InsufficientStock {
                key: IngredientKey::new("consumables", "medium-cup"),
                required: 10,
                available: 5,
            })
            .code(),
            FulfillmentErrorCode::InsufficientStock
        );
        assert_eq!(
            EngineError::Stock(StockError::CategoryNotFound("powders".to_string())).code(),
            FulfillmentErrorCode::CategoryNotFound
        );
        assert_eq!(
            EngineError::Stock(StockError::ValueOutOfRange(IngredientKey::new(
                "consumables",
                "medium-cup"
            )))
            .code(),
            FulfillmentErrorCode::InsufficientStock
        );
        assert_eq!(
            EngineError::InvalidState {
                order_id: "order-1".to_string(),
                status: OrderStatus::Completed,
            }
            .code(),
            FulfillmentErrorCode::InvalidState
        );
    }

    #[test]
    fn test_out_of_range_adjustment_is_a_validation_error() {
        let err = EngineError::Stock(StockError::ValueOutOfRange(IngredientKey::new(
            "consumables",
            "medium-cup",
        )));
        let app: shared::AppError = err.into();
        assert_eq!(app.code, shared::ErrorCode::ValidationFailed);
        assert!(app.message.contains("consumables/medium-cup"));
    }

    #[test]
    fn test_insufficient_stock_message_names_item() {
        let err = EngineError::Stock(StockError::InsufficientStock {
            key: IngredientKey::new("consumables", "medium-cup"),
            required: 10,
            available: 5,
        });
        let public = err.to_fulfillment_error();
        assert!(public.message.contains("consumables/medium-cup"));
        assert!(public.message.contains("10"));
        assert!(public.message.contains('5'));
    }
}
