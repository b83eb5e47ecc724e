//! Order API Module
//!
//! Order intake and fulfillment. The POST / route is the front-counter path:
//! deduct stock and record the completed order in one shot. The /pending
//! routes cover the pre-order workflow where fulfillment happens later.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::place_and_fulfill).get(handler::list))
        .route("/pending", post(handler::place_pending))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/fulfill", post(handler::fulfill))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/void", post(handler::void))
}
