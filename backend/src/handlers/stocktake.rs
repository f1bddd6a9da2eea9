//! HTTP handlers for the stocktake workflow

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::stocktake::{
    CountSheetRow, StocktakeReport, StocktakeService, SubmitCountsInput,
};
use crate::AppState;

/// The count sheet: every position with its predicted book stock
pub async fn get_count_sheet(State(state): State<AppState>) -> AppResult<Json<Vec<CountSheetRow>>> {
    let service = StocktakeService::new(state.db);
    let sheet = service.sheet(Utc::now()).await?;
    Ok(Json(sheet))
}

/// Submit a batch of physical counts for reconciliation
pub async fn submit_counts(
    State(state): State<AppState>,
    Json(input): Json<SubmitCountsInput>,
) -> AppResult<Json<StocktakeReport>> {
    let service = StocktakeService::new(state.db);
    let report = service.submit_counts(input, Utc::now()).await?;
    Ok(Json(report))
}
