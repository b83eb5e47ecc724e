//! Unified error codes for the POS edge server
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 7xxx: Inventory errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Cart has no lines
    EmptyCart = 4002,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4004,
    /// Order has already been voided
    OrderAlreadyVoided = 4005,
    /// Operation not valid for the order's current status
    InvalidOrderState = 4006,

    // ==================== 6xxx: Catalog ====================
    /// Product not found in the menu
    ProductNotFound = 6001,
    /// Size not offered for this product
    SizeNotAvailable = 6002,
    /// Addon not found in the menu
    AddonNotFound = 6003,
    /// No recipe defined for this product/size or addon
    UnknownRecipe = 6004,

    // ==================== 7xxx: Inventory ====================
    /// Inventory category document does not exist
    InventoryCategoryNotFound = 7001,
    /// Item is not tracked in its category
    ItemNotTracked = 7002,
    /// Not enough stock to satisfy the request
    InsufficientStock = 7003,
    /// Adjustment would take stock below zero
    StockBelowZero = 7004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Store temporarily unavailable, safe to retry
    StoreUnavailable = 9004,
}

impl ErrorCode {
    /// Get the default English message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",

            Self::OrderNotFound => "Order not found",
            Self::EmptyCart => "Cart is empty",
            Self::OrderAlreadyCompleted => "Order has already been completed",
            Self::OrderAlreadyCancelled => "Order has already been cancelled",
            Self::OrderAlreadyVoided => "Order has already been voided",
            Self::InvalidOrderState => "Operation not valid for the order's current status",

            Self::ProductNotFound => "Product not found",
            Self::SizeNotAvailable => "Size not available for this product",
            Self::AddonNotFound => "Addon not found",
            Self::UnknownRecipe => "No recipe defined for this item",

            Self::InventoryCategoryNotFound => "Inventory category not found",
            Self::ItemNotTracked => "Item is not tracked in inventory",
            Self::InsufficientStock => "Insufficient stock",
            Self::StockBelowZero => "Stock cannot go below zero",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::StoreUnavailable => "Store temporarily unavailable",
        }
    }

    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Error returned when deserializing an unknown error code value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            5 => Self::InvalidRequest,

            4001 => Self::OrderNotFound,
            4002 => Self::EmptyCart,
            4003 => Self::OrderAlreadyCompleted,
            4004 => Self::OrderAlreadyCancelled,
            4005 => Self::OrderAlreadyVoided,
            4006 => Self::InvalidOrderState,

            6001 => Self::ProductNotFound,
            6002 => Self::SizeNotAvailable,
            6003 => Self::AddonNotFound,
            6004 => Self::UnknownRecipe,

            7001 => Self::InventoryCategoryNotFound,
            7002 => Self::ItemNotTracked,
            7003 => Self::InsufficientStock,
            7004 => Self::StockBelowZero,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ConfigError,
            9004 => Self::StoreUnavailable,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::EmptyCart,
            ErrorCode::UnknownRecipe,
            ErrorCode::InsufficientStock,
            ErrorCode::StoreUnavailable,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code_rejected() {
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ErrorCode::InsufficientStock.to_string(), "E7003");
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::EmptyCart).unwrap();
        assert_eq!(json, "4002");
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::EmptyCart);
    }
}
