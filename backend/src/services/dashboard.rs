//! Real-time stock monitoring service
//!
//! Joins the stock rows with item metadata and supplier ordering terms,
//! projects each position to the current instant with the weighted
//! day-of-week model, and classifies positions against their safety stock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use shared::types::round2;
use shared::validation::validate_stock_record;
use shared::{StockRecord, StockStatus};

use crate::error::AppResult;

/// Dashboard service producing the live stock view
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// One (item, supplier) position with its live prediction
#[derive(Debug, Clone, Serialize)]
pub struct StockOverview {
    pub item_id: i64,
    pub supplier_id: i64,
    pub item_name: String,
    pub category: String,
    pub supplier_name: String,
    /// Book stock at the last physical count, base units
    pub stock: f64,
    pub avg_consumption: f64,
    pub last_checked_at: DateTime<Utc>,
    /// Projected stock as of the query instant, base units
    pub predicted_stock: f64,
    pub safety_stock: f64,
    pub base_unit: String,
    pub status: StockStatus,
}

/// Dashboard headline numbers plus the full position list
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_positions: usize,
    pub needs_reorder: usize,
    pub positions: Vec<StockOverview>,
}

/// Row for the unified stock query
#[derive(Debug, FromRow)]
struct StockDetailRow {
    item_id: i64,
    supplier_id: i64,
    item_name: String,
    category: String,
    supplier_name: String,
    stock: f64,
    avg_consumption: f64,
    last_checked_at: DateTime<Utc>,
    safety_stock: Option<f64>,
    base_unit: Option<String>,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Live view of every stock position, predicted as of `now`
    pub async fn overview(&self, now: DateTime<Utc>) -> AppResult<DashboardSummary> {
        let rows = self.fetch_stock_details().await?;

        let mut positions = Vec::with_capacity(rows.len());
        for row in rows {
            // Rows with malformed numerics are reported, not propagated;
            // the rest of the dashboard still renders.
            if let Err(reason) = validate_stock_record(row.stock, row.avg_consumption) {
                tracing::warn!(
                    item_id = row.item_id,
                    supplier_id = row.supplier_id,
                    "skipping stock row: {}",
                    reason
                );
                continue;
            }

            let record = StockRecord {
                item_id: row.item_id,
                supplier_id: row.supplier_id,
                stock: row.stock,
                avg_consumption: row.avg_consumption,
                last_checked_at: row.last_checked_at,
            };
            let predicted = record.predict(now);
            let safety_stock = row.safety_stock.unwrap_or(0.0);

            positions.push(StockOverview {
                item_id: record.item_id,
                supplier_id: record.supplier_id,
                item_name: row.item_name,
                category: row.category,
                supplier_name: row.supplier_name,
                stock: record.stock,
                avg_consumption: record.avg_consumption,
                last_checked_at: record.last_checked_at,
                predicted_stock: round2(predicted),
                safety_stock,
                base_unit: row.base_unit.unwrap_or_default(),
                status: StockStatus::classify(predicted, safety_stock),
            });
        }

        let needs_reorder = positions
            .iter()
            .filter(|p| p.status == StockStatus::NeedsReorder)
            .count();

        Ok(DashboardSummary {
            total_positions: positions.len(),
            needs_reorder,
            positions,
        })
    }

    /// Positions currently below their safety stock
    pub async fn reorder_alerts(&self, now: DateTime<Utc>) -> AppResult<Vec<StockOverview>> {
        let summary = self.overview(now).await?;
        Ok(summary
            .positions
            .into_iter()
            .filter(|p| p.status == StockStatus::NeedsReorder)
            .collect())
    }

    async fn fetch_stock_details(&self) -> AppResult<Vec<StockDetailRow>> {
        let rows = sqlx::query_as::<_, StockDetailRow>(
            r#"
            SELECT s.item_id, s.supplier_id,
                   i.name AS item_name, i.category,
                   sp.name AS supplier_name,
                   s.stock, s.avg_consumption, s.last_checked_at,
                   d.safety_stock, d.base_unit
            FROM stocks s
            JOIN items i ON i.id = s.item_id
            JOIN suppliers sp ON sp.id = s.supplier_id
            LEFT JOIN supplier_details d
              ON d.item_id = s.item_id AND d.supplier_id = s.supplier_id
            ORDER BY i.category, i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
