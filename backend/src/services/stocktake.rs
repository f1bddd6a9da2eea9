//! Physical stocktake service
//!
//! Produces the count sheet (book stock predicted to the current instant)
//! and reconciles submitted counts row by row: each count back-solves the
//! implied daily usage since the last check and blends it into the learned
//! consumption rate. Rows are independent; a failure on one never blocks
//! the others.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::forecast::DEFAULT_SMOOTHING_ALPHA;
use shared::types::round2;
use shared::validation::{validate_counted_qty, validate_stock_record};
use shared::{CheckStaleness, StockRecord};

use crate::error::AppResult;

/// Stocktake service for count sheets and count reconciliation
#[derive(Clone)]
pub struct StocktakeService {
    db: PgPool,
}

/// One row of the count sheet shown to the operator
#[derive(Debug, Clone, Serialize)]
pub struct CountSheetRow {
    pub item_id: i64,
    pub supplier_id: i64,
    pub item_name: String,
    pub category: String,
    /// Book stock projected to the sheet's timestamp
    pub predicted_stock: f64,
    pub base_unit: String,
    /// How overdue this row is for a physical check
    pub staleness: CheckStaleness,
    pub last_checked_at: DateTime<Utc>,
}

/// A single submitted count. A null `counted_qty` means the operator left
/// the row blank; it is skipped, not reconciled.
#[derive(Debug, Clone, Deserialize)]
pub struct CountEntry {
    pub item_id: i64,
    pub supplier_id: i64,
    pub counted_qty: Option<f64>,
}

/// Batch of counts from one stocktake pass
#[derive(Debug, Deserialize)]
pub struct SubmitCountsInput {
    pub counts: Vec<CountEntry>,
}

/// A successfully reconciled row
#[derive(Debug, Clone, Serialize)]
pub struct AppliedCount {
    pub item_id: i64,
    pub supplier_id: i64,
    pub item_name: String,
    pub new_stock: f64,
    pub previous_avg_consumption: f64,
    pub new_avg_consumption: f64,
    pub checked_at: DateTime<Utc>,
}

/// A row that could not be reconciled, with the cause
#[derive(Debug, Clone, Serialize)]
pub struct CountFailure {
    pub item_id: i64,
    pub supplier_id: i64,
    pub item_name: Option<String>,
    pub reason: String,
}

/// Outcome of a stocktake submission
#[derive(Debug, Serialize)]
pub struct StocktakeReport {
    pub applied: Vec<AppliedCount>,
    pub skipped: usize,
    pub failures: Vec<CountFailure>,
}

/// Row for the count sheet query
#[derive(Debug, FromRow)]
struct SheetRow {
    item_id: i64,
    supplier_id: i64,
    item_name: String,
    category: String,
    stock: f64,
    avg_consumption: f64,
    last_checked_at: DateTime<Utc>,
    base_unit: Option<String>,
}

/// Row fetched per submitted count
#[derive(Debug, FromRow)]
struct StockStateRow {
    item_name: String,
    stock: f64,
    avg_consumption: f64,
    last_checked_at: DateTime<Utc>,
}

impl StocktakeService {
    /// Create a new StocktakeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// The count sheet: every position with its predicted book stock
    pub async fn sheet(&self, now: DateTime<Utc>) -> AppResult<Vec<CountSheetRow>> {
        let rows = sqlx::query_as::<_, SheetRow>(
            r#"
            SELECT s.item_id, s.supplier_id,
                   i.name AS item_name, i.category,
                   s.stock, s.avg_consumption, s.last_checked_at,
                   d.base_unit
            FROM stocks s
            JOIN items i ON i.id = s.item_id
            LEFT JOIN supplier_details d
              ON d.item_id = s.item_id AND d.supplier_id = s.supplier_id
            ORDER BY i.category, i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let record = StockRecord {
                    item_id: r.item_id,
                    supplier_id: r.supplier_id,
                    stock: r.stock,
                    avg_consumption: r.avg_consumption,
                    last_checked_at: r.last_checked_at,
                };
                CountSheetRow {
                    item_id: record.item_id,
                    supplier_id: record.supplier_id,
                    item_name: r.item_name,
                    category: r.category,
                    predicted_stock: round2(record.predict(now)),
                    base_unit: r.base_unit.unwrap_or_default(),
                    staleness: CheckStaleness::classify(record.last_checked_at, now),
                    last_checked_at: record.last_checked_at,
                }
            })
            .collect())
    }

    /// Reconcile a batch of physical counts.
    ///
    /// Each row is validated, learned from and persisted independently;
    /// failures are collected into the report and logged, and successful
    /// rows are never rolled back because a sibling failed.
    pub async fn submit_counts(
        &self,
        input: SubmitCountsInput,
        now: DateTime<Utc>,
    ) -> AppResult<StocktakeReport> {
        let mut report = StocktakeReport {
            applied: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        };

        for entry in input.counts {
            let counted = match entry.counted_qty {
                Some(q) => q,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };

            match self.reconcile_row(&entry, counted, now).await {
                Ok(applied) => report.applied.push(applied),
                Err(failure) => {
                    tracing::warn!(
                        item_id = failure.item_id,
                        supplier_id = failure.supplier_id,
                        "count not applied: {}",
                        failure.reason
                    );
                    report.failures.push(failure);
                }
            }
        }

        tracing::info!(
            applied = report.applied.len(),
            skipped = report.skipped,
            failed = report.failures.len(),
            "stocktake submitted"
        );

        Ok(report)
    }

    async fn reconcile_row(
        &self,
        entry: &CountEntry,
        counted: f64,
        now: DateTime<Utc>,
    ) -> Result<AppliedCount, CountFailure> {
        let fail = |item_name: Option<String>, reason: String| CountFailure {
            item_id: entry.item_id,
            supplier_id: entry.supplier_id,
            item_name,
            reason,
        };

        validate_counted_qty(counted).map_err(|e| fail(None, e.to_string()))?;

        let row = sqlx::query_as::<_, StockStateRow>(
            r#"
            SELECT i.name AS item_name, s.stock, s.avg_consumption, s.last_checked_at
            FROM stocks s
            JOIN items i ON i.id = s.item_id
            WHERE s.item_id = $1 AND s.supplier_id = $2
            "#,
        )
        .bind(entry.item_id)
        .bind(entry.supplier_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| fail(None, e.to_string()))?
        .ok_or_else(|| fail(None, "stock row not found".to_string()))?;

        let record = StockRecord {
            item_id: entry.item_id,
            supplier_id: entry.supplier_id,
            stock: row.stock,
            avg_consumption: row.avg_consumption,
            last_checked_at: row.last_checked_at,
        };

        validate_stock_record(record.stock, record.avg_consumption)
            .map_err(|e| fail(Some(row.item_name.clone()), e.to_string()))?;

        let outcome = record.reconcile(counted, now, DEFAULT_SMOOTHING_ALPHA);

        sqlx::query(
            r#"
            UPDATE stocks
            SET stock = $1, avg_consumption = $2, last_checked_at = $3
            WHERE item_id = $4 AND supplier_id = $5
            "#,
        )
        .bind(outcome.new_stock)
        .bind(outcome.new_avg_consumption)
        .bind(outcome.checked_at)
        .bind(entry.item_id)
        .bind(entry.supplier_id)
        .execute(&self.db)
        .await
        .map_err(|e| fail(Some(row.item_name.clone()), e.to_string()))?;

        Ok(AppliedCount {
            item_id: entry.item_id,
            supplier_id: entry.supplier_id,
            item_name: row.item_name,
            new_stock: outcome.new_stock,
            previous_avg_consumption: row.avg_consumption,
            new_avg_consumption: outcome.new_avg_consumption,
            checked_at: outcome.checked_at,
        })
    }
}
