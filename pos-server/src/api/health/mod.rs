//! Health check route
//!
//! | Path | Method | Description | Auth |
//! |------|--------|-------------|------|
//! | /api/health | GET | Liveness and store check | none |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// Status (healthy | degraded)
    status: &'static str,
    version: &'static str,
    environment: String,
    /// Whether the embedded store answered a read
    store_ok: bool,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let store_ok = state.storage.list_inventory().is_ok();
    Json(HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        store_ok,
    })
}
