//! HTTP handlers for the real-time stock dashboard

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::dashboard::{DashboardService, DashboardSummary, StockOverview};
use crate::AppState;

/// Live view of every stock position with predictions and summary counts
pub async fn get_stock_overview(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardSummary>> {
    let service = DashboardService::new(state.db);
    let summary = service.overview(Utc::now()).await?;
    Ok(Json(summary))
}

/// Positions currently below their safety stock
pub async fn get_reorder_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StockOverview>>> {
    let service = DashboardService::new(state.db);
    let alerts = service.reorder_alerts(Utc::now()).await?;
    Ok(Json(alerts))
}
