//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Order errors
/// - 6xxx: Catalog errors
/// - 7xxx: Inventory errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Order errors (4xxx)
    Order,
    /// Catalog errors (6xxx)
    Catalog,
    /// Inventory errors (7xxx)
    Inventory,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Order,
            6000..7000 => Self::Catalog,
            7000..8000 => Self::Inventory,
            _ => Self::System,
        }
    }

    /// Whether errors in this category are retryable without user action
    ///
    /// Only transient system errors qualify. Order/catalog/inventory errors
    /// require correcting the cart, the menu, or the stock first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl ErrorCode {
    /// Get the category of this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCode::EmptyCart.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::UnknownRecipe.category(), ErrorCategory::Catalog);
        assert_eq!(
            ErrorCode::InsufficientStock.category(),
            ErrorCategory::Inventory
        );
        assert_eq!(
            ErrorCode::StoreUnavailable.category(),
            ErrorCategory::System
        );
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::General);
    }

    #[test]
    fn test_retryability() {
        assert!(ErrorCode::StoreUnavailable.category().is_retryable());
        assert!(!ErrorCode::InsufficientStock.category().is_retryable());
    }
}
