//! Supplier master models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A supplier the cafe orders from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
}

/// Per-(item, supplier) ordering terms and unit bookkeeping.
///
/// Stock is counted in `base_unit` (a cup, a gram); orders are placed in
/// `order_unit` (a box, a pack). `conversion_factor` is the number of base
/// units per purchase unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierDetail {
    pub item_id: i64,
    pub supplier_id: i64,
    pub order_url: Option<String>,
    pub order_unit: String,
    /// Minimum order quantity, in purchase units
    pub moq: i64,
    pub order_unit_price: Option<Decimal>,
    /// Reorder threshold, in base units
    pub safety_stock: f64,
    pub base_unit: String,
    /// Base units per purchase unit (integer, >= 1)
    pub conversion_factor: i64,
}
