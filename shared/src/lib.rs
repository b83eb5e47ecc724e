//! Shared types for the bubble-tea POS edge server
//!
//! Domain types used by both the server and its clients: error codes and
//! response envelopes, menu/product models, cart and order types, and the
//! fulfillment request/response contract.

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use order::{
    CartLine, FulfillmentError, FulfillmentErrorCode, FulfillmentResponse, Order, OrderItem,
    OrderStatus,
};
