//! API routing module
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`orders`] - order intake, fulfillment, and browsing
//! - [`inventory`] - stock snapshots and manual adjustments
//! - [`stock_logs`] - inventory movement audit trail

pub mod health;
pub mod inventory;
pub mod orders;
pub mod stock_logs;

use crate::core::ServerState;
use axum::Router;

/// Assemble the full API router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(inventory::router())
        .merge(stock_logs::router())
        .with_state(state)
}
