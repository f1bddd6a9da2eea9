//! Stock position models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forecast::{predict_stock, reconcile, Reconciliation};

/// The persisted stock position for one (item, supplier) pair.
///
/// `stock` is the quantity counted (or received into) at `last_checked_at`;
/// the live level is predicted from it, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRecord {
    pub item_id: i64,
    pub supplier_id: i64,
    /// Base units; never negative after a write
    pub stock: f64,
    /// Learned average daily consumption, base units per weighted day
    pub avg_consumption: f64,
    pub last_checked_at: DateTime<Utc>,
}

impl StockRecord {
    /// Project this position's stock level to `now`
    pub fn predict(&self, now: DateTime<Utc>) -> f64 {
        predict_stock(self.stock, self.avg_consumption, self.last_checked_at, now)
    }

    /// Reconcile a physical count against this position
    pub fn reconcile(&self, counted: f64, now: DateTime<Utc>, alpha: f64) -> Reconciliation {
        reconcile(
            self.stock,
            counted,
            self.avg_consumption,
            self.last_checked_at,
            now,
            alpha,
        )
    }
}

/// Dashboard classification of a stock position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    NeedsReorder,
    Stable,
}

impl StockStatus {
    pub fn classify(predicted_stock: f64, safety_stock: f64) -> Self {
        if crate::forecast::needs_reorder(predicted_stock, safety_stock) {
            StockStatus::NeedsReorder
        } else {
            StockStatus::Stable
        }
    }
}

/// How recently a position was physically checked, shown on the count
/// sheet so overdue rows stand out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStaleness {
    /// Checked within the last 3 days
    Fresh,
    /// 4 to 7 days since the last check
    Aging,
    /// More than 7 days unchecked
    Overdue,
}

impl CheckStaleness {
    /// Bucket by whole elapsed days since the last check
    pub fn classify(last_checked: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days = (now - last_checked).num_days();
        if days <= 3 {
            CheckStaleness::Fresh
        } else if days <= 7 {
            CheckStaleness::Aging
        } else {
            CheckStaleness::Overdue
        }
    }
}
