//! Purchase ordering service
//!
//! Recommends what to reorder, records submitted carts as per-supplier
//! purchase orders, lists orders still in transit, and books received
//! goods into stock with unit conversion.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::forecast::{needs_reorder, predict_stock, to_base_units};
use shared::types::round2;
use shared::validation::validate_order_qty;
use shared::{order_subtotal, OrderStatus, PurchaseOrder, PurchaseOrderLine};

use crate::error::{AppError, AppResult};

/// Order service for recommendations, submission and receiving
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// A position whose predicted stock has fallen below its safety stock
#[derive(Debug, Clone, Serialize)]
pub struct OrderRecommendation {
    pub item_id: i64,
    pub supplier_id: i64,
    pub item_name: String,
    pub supplier_name: String,
    pub predicted_stock: f64,
    pub safety_stock: f64,
    /// Suggested order quantity: the supplier's minimum order quantity
    pub suggested_qty: i64,
    pub order_unit: String,
    pub order_unit_price: Option<Decimal>,
    pub order_url: Option<String>,
}

/// One cart line, quantity in purchase units
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub item_id: i64,
    pub supplier_id: i64,
    pub quantity: i64,
}

/// The explicit order cart submitted by the operator
#[derive(Debug, Deserialize)]
pub struct OrderCart {
    pub lines: Vec<CartLine>,
}

/// A purchase order successfully recorded for one supplier
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub supplier_name: String,
    pub lines: Vec<PurchaseOrderLine>,
}

/// A supplier whose order could not be recorded
#[derive(Debug, Clone, Serialize)]
pub struct OrderFailure {
    pub supplier_id: i64,
    pub reason: String,
}

/// Outcome of a cart submission: recorded orders are kept even when a
/// sibling supplier's order failed
#[derive(Debug, Serialize)]
pub struct OrderSubmission {
    pub orders: Vec<PlacedOrder>,
    pub failures: Vec<OrderFailure>,
}

/// One line of a pending order, for display
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PendingOrderLine {
    pub item_id: i64,
    pub item_name: String,
    pub ordered_qty: i64,
}

/// A purchase order still in transit
#[derive(Debug, Clone, Serialize)]
pub struct PendingOrder {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub supplier_name: String,
    pub lines: Vec<PendingOrderLine>,
}

/// One received line after unit conversion
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub item_id: i64,
    pub item_name: String,
    pub ordered_qty: i64,
    pub conversion_factor: i64,
    /// Quantity credited to stock, in base units
    pub added_base_qty: f64,
}

/// Outcome of receiving one order
#[derive(Debug, Serialize)]
pub struct ReceiptSummary {
    pub order_id: i64,
    pub supplier_id: i64,
    pub lines: Vec<ReceiptLine>,
}

/// Row for the recommendation query
#[derive(Debug, FromRow)]
struct RecommendationRow {
    item_id: i64,
    supplier_id: i64,
    item_name: String,
    supplier_name: String,
    stock: f64,
    avg_consumption: f64,
    last_checked_at: DateTime<Utc>,
    safety_stock: f64,
    moq: i64,
    order_unit: String,
    order_unit_price: Option<Decimal>,
    order_url: Option<String>,
}

/// Row for the pending order header query
#[derive(Debug, FromRow)]
struct OrderHeaderRow {
    order_id: i64,
    supplier_id: i64,
    total_price: Decimal,
    status: String,
    ordered_at: DateTime<Utc>,
    supplier_name: String,
}

/// Row for the receiving line query
#[derive(Debug, FromRow)]
struct ReceiveLineRow {
    item_id: i64,
    item_name: String,
    ordered_qty: i64,
    conversion_factor: Option<i64>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Positions below safety stock as of `now`, with ordering terms
    pub async fn recommendations(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<OrderRecommendation>> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            r#"
            SELECT s.item_id, s.supplier_id,
                   i.name AS item_name, sp.name AS supplier_name,
                   s.stock, s.avg_consumption, s.last_checked_at,
                   d.safety_stock, d.moq, d.order_unit, d.order_unit_price, d.order_url
            FROM stocks s
            JOIN items i ON i.id = s.item_id
            JOIN suppliers sp ON sp.id = s.supplier_id
            JOIN supplier_details d
              ON d.item_id = s.item_id AND d.supplier_id = s.supplier_id
            ORDER BY sp.name, i.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|r| {
                let predicted =
                    predict_stock(r.stock, r.avg_consumption, r.last_checked_at, now);
                if !needs_reorder(predicted, r.safety_stock) {
                    return None;
                }
                Some(OrderRecommendation {
                    item_id: r.item_id,
                    supplier_id: r.supplier_id,
                    item_name: r.item_name,
                    supplier_name: r.supplier_name,
                    predicted_stock: round2(predicted),
                    safety_stock: r.safety_stock,
                    suggested_qty: r.moq.max(1),
                    order_unit: r.order_unit,
                    order_unit_price: r.order_unit_price,
                    order_url: r.order_url,
                })
            })
            .collect())
    }

    /// Record a cart as one purchase order per supplier.
    ///
    /// Each supplier's order (header + lines) is inserted in its own
    /// transaction; a failure for one supplier is reported and does not
    /// undo the orders already recorded for the others.
    pub async fn submit_cart(&self, cart: OrderCart) -> AppResult<OrderSubmission> {
        let mut submission = OrderSubmission {
            orders: Vec::new(),
            failures: Vec::new(),
        };

        // Group valid lines per supplier, rejecting bad quantities up front
        let mut by_supplier: BTreeMap<i64, Vec<CartLine>> = BTreeMap::new();
        for line in cart.lines {
            if let Err(reason) = validate_order_qty(line.quantity) {
                submission.failures.push(OrderFailure {
                    supplier_id: line.supplier_id,
                    reason: format!("item {}: {}", line.item_id, reason),
                });
                continue;
            }
            by_supplier.entry(line.supplier_id).or_default().push(line);
        }

        for (supplier_id, lines) in by_supplier {
            match self.place_order(supplier_id, &lines).await {
                Ok(placed) => submission.orders.push(placed),
                Err(err) => {
                    tracing::warn!(supplier_id, "order not recorded: {}", err);
                    submission.failures.push(OrderFailure {
                        supplier_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(submission)
    }

    /// Orders still in transit, with their lines
    pub async fn list_pending(&self) -> AppResult<Vec<PendingOrder>> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(
            r#"
            SELECT o.order_id, o.supplier_id, o.total_price, o.status, o.ordered_at,
                   sp.name AS supplier_name
            FROM purchase_orders o
            JOIN suppliers sp ON sp.id = o.supplier_id
            WHERE o.status = 'pending_shipment'
            ORDER BY o.ordered_at
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut pending = Vec::with_capacity(headers.len());
        for header in headers {
            let lines = sqlx::query_as::<_, PendingOrderLine>(
                r#"
                SELECT l.item_id, i.name AS item_name, l.ordered_qty
                FROM purchase_order_lines l
                JOIN items i ON i.id = l.item_id
                WHERE l.order_id = $1
                ORDER BY i.name
                "#,
            )
            .bind(header.order_id)
            .fetch_all(&self.db)
            .await?;

            pending.push(PendingOrder {
                order: Self::order_from_header(&header)?,
                supplier_name: header.supplier_name,
                lines,
            });
        }

        Ok(pending)
    }

    /// Receive a pending order: credit each line to stock in base units
    /// and flip the status, all in one transaction.
    pub async fn receive(&self, order_id: i64) -> AppResult<ReceiptSummary> {
        let mut tx = self.db.begin().await?;

        let header = sqlx::query_as::<_, (i64, String)>(
            "SELECT supplier_id, status FROM purchase_orders WHERE order_id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let (supplier_id, status) = header;
        if status != OrderStatus::PendingShipment.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "order {} has already been received",
                order_id
            )));
        }

        let rows = sqlx::query_as::<_, ReceiveLineRow>(
            r#"
            SELECT l.item_id, i.name AS item_name, l.ordered_qty, d.conversion_factor
            FROM purchase_order_lines l
            JOIN items i ON i.id = l.item_id
            LEFT JOIN supplier_details d
              ON d.item_id = l.item_id AND d.supplier_id = $2
            WHERE l.order_id = $1
            "#,
        )
        .bind(order_id)
        .bind(supplier_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let added = to_base_units(row.ordered_qty, row.conversion_factor);

            // Receiving only moves the stored quantity; the prediction
            // clock and the learned rate belong to the stocktake workflow.
            sqlx::query(
                r#"
                INSERT INTO stocks (item_id, supplier_id, stock, avg_consumption, last_checked_at)
                VALUES ($1, $2, $3, 0, now())
                ON CONFLICT (item_id, supplier_id)
                DO UPDATE SET stock = stocks.stock + EXCLUDED.stock
                "#,
            )
            .bind(row.item_id)
            .bind(supplier_id)
            .bind(added)
            .execute(&mut *tx)
            .await?;

            lines.push(ReceiptLine {
                item_id: row.item_id,
                item_name: row.item_name,
                ordered_qty: row.ordered_qty,
                conversion_factor: row.conversion_factor.unwrap_or(1),
                added_base_qty: added,
            });
        }

        sqlx::query("UPDATE purchase_orders SET status = $1 WHERE order_id = $2")
            .bind(OrderStatus::Received.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id, lines = lines.len(), "order received into stock");

        Ok(ReceiptSummary {
            order_id,
            supplier_id,
            lines,
        })
    }

    async fn place_order(&self, supplier_id: i64, lines: &[CartLine]) -> AppResult<PlacedOrder> {
        let mut tx = self.db.begin().await?;

        let supplier_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM suppliers WHERE id = $1",
        )
        .bind(supplier_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        let mut priced = Vec::with_capacity(lines.len());
        for line in lines {
            let unit_price = sqlx::query_scalar::<_, Option<Decimal>>(
                r#"
                SELECT order_unit_price FROM supplier_details
                WHERE item_id = $1 AND supplier_id = $2
                "#,
            )
            .bind(line.item_id)
            .bind(supplier_id)
            .fetch_optional(&mut *tx)
            .await?
            .flatten();

            priced.push((line.quantity, unit_price));
        }
        let total_price = order_subtotal(priced);

        let (order_id, ordered_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            r#"
            INSERT INTO purchase_orders (supplier_id, total_price, status)
            VALUES ($1, $2, $3)
            RETURNING order_id, ordered_at
            "#,
        )
        .bind(supplier_id)
        .bind(total_price)
        .bind(OrderStatus::PendingShipment.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let order_lines: Vec<PurchaseOrderLine> = lines
            .iter()
            .map(|line| PurchaseOrderLine {
                order_id,
                item_id: line.item_id,
                ordered_qty: line.quantity,
            })
            .collect();

        for line in &order_lines {
            sqlx::query(
                "INSERT INTO purchase_order_lines (order_id, item_id, ordered_qty) VALUES ($1, $2, $3)",
            )
            .bind(line.order_id)
            .bind(line.item_id)
            .bind(line.ordered_qty)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(PlacedOrder {
            order: PurchaseOrder {
                order_id,
                supplier_id,
                total_price,
                status: OrderStatus::PendingShipment,
                ordered_at,
            },
            supplier_name,
            lines: order_lines,
        })
    }

    fn order_from_header(header: &OrderHeaderRow) -> AppResult<PurchaseOrder> {
        let status = OrderStatus::from_str(&header.status).ok_or_else(|| {
            AppError::Internal(format!("unknown order status '{}'", header.status))
        })?;

        Ok(PurchaseOrder {
            order_id: header.order_id,
            supplier_id: header.supplier_id,
            total_price: header.total_price,
            status,
            ordered_at: header.ordered_at,
        })
    }
}
