//! HTTP handlers for master data management

use axum::{
    extract::{Path, State},
    Json,
};

use shared::{Item, Supplier};

use crate::error::AppResult;
use crate::services::catalog::{CatalogService, RegisterInput, Registration, RenameItemInput};
use crate::AppState;

/// Register an item with a supplier and its ordering terms
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<Json<Registration>> {
    let service = CatalogService::new(state.db);
    let registration = service.register(input).await?;
    Ok(Json(registration))
}

/// List all registered items
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    let service = CatalogService::new(state.db);
    let items = service.list_items().await?;
    Ok(Json(items))
}

/// List all registered suppliers
pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    let service = CatalogService::new(state.db);
    let suppliers = service.list_suppliers().await?;
    Ok(Json(suppliers))
}

/// Rename an item
pub async fn rename_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(input): Json<RenameItemInput>,
) -> AppResult<Json<Item>> {
    let service = CatalogService::new(state.db);
    let item = service.rename_item(item_id, input).await?;
    Ok(Json(item))
}
