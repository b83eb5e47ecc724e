//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::StatusCode;
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::order::{CartLine, FulfillmentResponse, Order, OrderStatus};

/// Cart submitted by the client shell
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub operator: Option<String>,
}

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Place and fulfill an order in one transaction
///
/// Always answers with the fulfillment envelope; the HTTP status mirrors the
/// error kind so plain HTTP clients can branch without parsing the body.
pub async fn place_and_fulfill(
    State(state): State<ServerState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> (StatusCode, Json<FulfillmentResponse>) {
    let response = state
        .engine
        .place_and_fulfill(&payload.items, payload.operator.as_deref())
        .await;
    (response_status(&response), Json(response))
}

/// Record a pending order without deducting stock
pub async fn place_pending(
    State(state): State<ServerState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .engine
        .place_order(&payload.items, payload.operator.as_deref())
        .await?;
    Ok(Json(order))
}

/// Operator attribution for state transitions
#[derive(Debug, Default, Deserialize)]
pub struct TransitionRequest {
    #[serde(default)]
    pub operator: Option<String>,
}

/// Fulfill a pending order
pub async fn fulfill(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<TransitionRequest>>,
) -> (StatusCode, Json<FulfillmentResponse>) {
    let operator = payload.as_ref().and_then(|p| p.operator.as_deref());
    let response = state.engine.fulfill_order(&id, operator).await;
    (response_status(&response), Json(response))
}

/// Cancel a pending order
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.engine.cancel_order(&id).await?;
    Ok(Json(order))
}

/// Void a pending order
pub async fn void(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.engine.void_order(&id).await?;
    Ok(Json(order))
}

/// List orders newest-first, optionally filtered by status
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let mut orders = state.storage.list_orders(query.status)?;
    orders.truncate(query.limit);
    Ok(Json(orders))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.storage.get_order(&id)?;
    Ok(Json(order))
}

fn response_status(response: &FulfillmentResponse) -> StatusCode {
    match &response.error {
        None => StatusCode::OK,
        Some(err) => err.code.error_code().http_status(),
    }
}
