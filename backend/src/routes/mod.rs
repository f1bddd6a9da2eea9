//! Route definitions for the Cafe Inventory Management Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Real-time dashboard
        .nest("/dashboard", dashboard_routes())
        // Stocktake (physical counts)
        .nest("/stocktake", stocktake_routes())
        // Purchase orders
        .nest("/orders", order_routes())
        // Master data
        .nest("/catalog", catalog_routes())
}

/// Dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/stocks", get(handlers::get_stock_overview))
        .route("/alerts", get(handlers::get_reorder_alerts))
}

/// Stocktake routes
fn stocktake_routes() -> Router<AppState> {
    Router::new()
        .route("/sheet", get(handlers::get_count_sheet))
        .route("/counts", post(handlers::submit_counts))
}

/// Purchase order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::submit_orders))
        .route("/recommendations", get(handlers::get_order_recommendations))
        .route("/pending", get(handlers::list_pending_orders))
        .route("/:order_id/receive", post(handlers::receive_order))
}

/// Master data routes
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/registrations", post(handlers::register))
        .route("/items", get(handlers::list_items))
        .route("/items/:item_id", put(handlers::rename_item))
        .route("/suppliers", get(handlers::list_suppliers))
}
