//! Stock Log API Module
//!
//! Read-only view of the inventory movement audit trail.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Stock log router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stock-logs", get(handler::list))
}
