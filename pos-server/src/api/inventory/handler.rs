//! Inventory API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::fulfillment::{StockChange, StockRequirement};
use crate::utils::{AppError, AppResult};
use shared::models::{CategorySnapshot, IngredientKey};

/// List every category with its tracked items and quantities
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<CategorySnapshot>>> {
    let snapshot = state.storage.list_inventory()?;
    Ok(Json(snapshot))
}

#[derive(Debug, Serialize)]
pub struct QuantityResponse {
    pub category: String,
    pub item: String,
    pub quantity: u64,
}

/// Read a single tracked quantity
pub async fn get_quantity(
    State(state): State<ServerState>,
    Path((category, item)): Path<(String, String)>,
) -> AppResult<Json<QuantityResponse>> {
    let quantity = state
        .storage
        .stock_quantity(&category, &item)?
        .ok_or_else(|| AppError::not_found(format!("Inventory item {category}/{item}")))?;
    Ok(Json(QuantityResponse {
        category,
        item,
        quantity,
    }))
}

/// One manual adjustment line
#[derive(Debug, Deserialize)]
pub struct AdjustmentLine {
    pub category: String,
    pub item: String,
    /// Signed delta: positive restocks, negative writes off
    pub delta: i64,
}

/// Manual adjustment request; the whole batch applies atomically
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub adjustments: Vec<AdjustmentLine>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Apply manual stock adjustments
pub async fn adjust(
    State(state): State<ServerState>,
    Json(payload): Json<AdjustRequest>,
) -> AppResult<Json<Vec<StockChange>>> {
    if payload.adjustments.is_empty() {
        return Err(AppError::validation("No adjustments provided"));
    }

    let requirements: Vec<StockRequirement> = payload
        .adjustments
        .iter()
        .map(|line| {
            StockRequirement::adjust(IngredientKey::new(&line.category, &line.item), line.delta)
        })
        .collect();

    let changes = state
        .engine
        .adjust_stock(&requirements, payload.user.as_deref())
        .await?;
    Ok(Json(changes))
}
