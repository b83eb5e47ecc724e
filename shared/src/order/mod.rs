//! Order types: cart input, persisted order records, and the fulfillment
//! request/response contract

pub mod types;

pub use types::{
    CartLine, FulfillmentError, FulfillmentErrorCode, FulfillmentResponse, Order, OrderAddon,
    OrderItem, OrderStatus,
};
