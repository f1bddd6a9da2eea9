//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Purchase order lifecycle. Orders are created in transit and make a
/// single, irreversible transition to received.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingShipment,
    Received,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingShipment => "pending_shipment",
            OrderStatus::Received => "received",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending_shipment" => Some(OrderStatus::PendingShipment),
            "received" => Some(OrderStatus::Received),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchase order placed with one supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrder {
    pub order_id: i64,
    pub supplier_id: i64,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
}

/// One line of a purchase order, quantity in purchase units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseOrderLine {
    pub order_id: i64,
    pub item_id: i64,
    pub ordered_qty: i64,
}

/// Price of one order line. A line without a quoted unit price counts
/// as zero, matching the ordering screen.
pub fn line_total(quantity: i64, unit_price: Option<Decimal>) -> Decimal {
    Decimal::from(quantity) * unit_price.unwrap_or(Decimal::ZERO)
}

/// Subtotal over (quantity, unit price) pairs for one supplier's order
pub fn order_subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (i64, Option<Decimal>)>,
{
    lines
        .into_iter()
        .map(|(quantity, unit_price)| line_total(quantity, unit_price))
        .sum()
}
