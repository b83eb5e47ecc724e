//! Inventory API Module
//!
//! Snapshot reads plus manual adjustments (restock, spoilage, correction).
//! All stock movement driven by orders goes through the order routes, never
//! through here.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Inventory router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{category}/{item}", get(handler::get_quantity))
        .route("/adjust", post(handler::adjust))
}
