//! Stock Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::StockLogEntry;

/// Query params for the audit trail
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// List stock log entries newest-first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<StockLogEntry>>> {
    let entries = state.storage.list_stock_logs(query.limit)?;
    Ok(Json(entries))
}
