//! HTTP handlers for purchase ordering and receiving

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::order::{
    OrderCart, OrderRecommendation, OrderService, OrderSubmission, PendingOrder, ReceiptSummary,
};
use crate::AppState;

/// Positions below safety stock, with suggested order quantities
pub async fn get_order_recommendations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<OrderRecommendation>>> {
    let service = OrderService::new(state.db);
    let recommendations = service.recommendations(Utc::now()).await?;
    Ok(Json(recommendations))
}

/// Submit the order cart; one purchase order is recorded per supplier
pub async fn submit_orders(
    State(state): State<AppState>,
    Json(cart): Json<OrderCart>,
) -> AppResult<Json<OrderSubmission>> {
    let service = OrderService::new(state.db);
    let submission = service.submit_cart(cart).await?;
    Ok(Json(submission))
}

/// Orders still in transit, with their lines
pub async fn list_pending_orders(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PendingOrder>>> {
    let service = OrderService::new(state.db);
    let pending = service.list_pending().await?;
    Ok(Json(pending))
}

/// Receive a pending order into stock
pub async fn receive_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<ReceiptSummary>> {
    let service = OrderService::new(state.db);
    let receipt = service.receive(order_id).await?;
    Ok(Json(receipt))
}
