//! Master data service
//!
//! One-shot registration of an item with its supplier and ordering terms
//! (find-or-create by name, so re-registering an existing pair just
//! refreshes its terms), plus the master lists and item renaming.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use sqlx::PgPool;

use shared::validation::{
    validate_conversion_factor, validate_moq, validate_required_name, validate_safety_stock,
};
use shared::{Item, Supplier, SupplierDetail};

use crate::error::{AppError, AppResult};

/// Catalog service for item/supplier master data
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Input for registering an item with a supplier.
/// Everything except `order_url` and `order_unit_price` is required.
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub supplier_name: String,
    pub item_name: String,
    pub category: String,
    pub order_url: Option<String>,
    pub order_unit: String,
    pub moq: i64,
    pub order_unit_price: Option<Decimal>,
    /// Reorder threshold, in base units
    pub safety_stock: f64,
    pub base_unit: String,
    /// Base units per purchase unit
    pub conversion_factor: i64,
}

/// Input for renaming an item
#[derive(Debug, Deserialize)]
pub struct RenameItemInput {
    pub name: String,
}

/// Result of a registration
#[derive(Debug, Serialize)]
pub struct Registration {
    pub item: Item,
    pub supplier: Supplier,
    pub detail: SupplierDetail,
    /// Whether a fresh zero stock row was created for the pair
    pub stock_initialized: bool,
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register an (item, supplier) pair: find-or-create both masters,
    /// upsert the ordering terms, and initialize a zero stock row if the
    /// pair has none. Runs as a single transaction.
    pub async fn register(&self, input: RegisterInput) -> AppResult<Registration> {
        Self::validate(&input)?;

        let mut tx = self.db.begin().await?;

        // Supplier: reuse by name or create
        let supplier_id = match sqlx::query_scalar::<_, i64>(
            "SELECT id FROM suppliers WHERE name = $1",
        )
        .bind(input.supplier_name.trim())
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(id) => id,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO suppliers (name) VALUES ($1) RETURNING id",
                )
                .bind(input.supplier_name.trim())
                .fetch_one(&mut *tx)
                .await?
            }
        };

        // Item: reuse by name or create
        let item_id = match sqlx::query_scalar::<_, i64>("SELECT id FROM items WHERE name = $1")
            .bind(input.item_name.trim())
            .fetch_optional(&mut *tx)
            .await?
        {
            Some(id) => id,
            None => {
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO items (name, category) VALUES ($1, $2) RETURNING id",
                )
                .bind(input.item_name.trim())
                .bind(input.category.trim())
                .fetch_one(&mut *tx)
                .await?
            }
        };

        sqlx::query(
            r#"
            INSERT INTO supplier_details
                (item_id, supplier_id, order_url, order_unit, moq,
                 order_unit_price, safety_stock, base_unit, conversion_factor)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (item_id, supplier_id) DO UPDATE SET
                order_url = EXCLUDED.order_url,
                order_unit = EXCLUDED.order_unit,
                moq = EXCLUDED.moq,
                order_unit_price = EXCLUDED.order_unit_price,
                safety_stock = EXCLUDED.safety_stock,
                base_unit = EXCLUDED.base_unit,
                conversion_factor = EXCLUDED.conversion_factor
            "#,
        )
        .bind(item_id)
        .bind(supplier_id)
        .bind(&input.order_url)
        .bind(input.order_unit.trim())
        .bind(input.moq)
        .bind(input.order_unit_price)
        .bind(input.safety_stock)
        .bind(input.base_unit.trim())
        .bind(input.conversion_factor)
        .execute(&mut *tx)
        .await?;

        // Fresh pairs start at zero stock with nothing learned yet
        let result = sqlx::query(
            r#"
            INSERT INTO stocks (item_id, supplier_id, stock, avg_consumption, last_checked_at)
            VALUES ($1, $2, 0, 0, $3)
            ON CONFLICT (item_id, supplier_id) DO NOTHING
            "#,
        )
        .bind(item_id)
        .bind(supplier_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(item_id, supplier_id, "registered item/supplier pair");

        Ok(Registration {
            item: Item {
                id: item_id,
                name: input.item_name.trim().to_string(),
                category: input.category.trim().to_string(),
            },
            supplier: Supplier {
                id: supplier_id,
                name: input.supplier_name.trim().to_string(),
            },
            detail: SupplierDetail {
                item_id,
                supplier_id,
                order_url: input.order_url,
                order_unit: input.order_unit.trim().to_string(),
                moq: input.moq,
                order_unit_price: input.order_unit_price,
                safety_stock: input.safety_stock,
                base_unit: input.base_unit.trim().to_string(),
                conversion_factor: input.conversion_factor,
            },
            stock_initialized: result.rows_affected() > 0,
        })
    }

    /// All registered items, ordered by name
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, category FROM items ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, category)| Item { id, name, category })
            .collect())
    }

    /// All registered suppliers, ordered by name
    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows =
            sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM suppliers ORDER BY name")
                .fetch_all(&self.db)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Supplier { id, name })
            .collect())
    }

    /// Rename an item. Renaming is the only permitted item mutation.
    pub async fn rename_item(&self, item_id: i64, input: RenameItemInput) -> AppResult<Item> {
        validate_required_name(&input.name).map_err(|e| AppError::Validation {
            field: "name".to_string(),
            message: e.to_string(),
            message_ko: "품목 이름을 입력해주세요".to_string(),
        })?;

        let row = sqlx::query_as::<_, (i64, String, String)>(
            "UPDATE items SET name = $1 WHERE id = $2 RETURNING id, name, category",
        )
        .bind(input.name.trim())
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(Item {
            id: row.0,
            name: row.1,
            category: row.2,
        })
    }

    fn validate(input: &RegisterInput) -> AppResult<()> {
        let required = [
            ("supplier_name", &input.supplier_name, "공급처 이름"),
            ("item_name", &input.item_name, "품목 이름"),
            ("category", &input.category, "카테고리"),
            ("order_unit", &input.order_unit, "주문 단위"),
            ("base_unit", &input.base_unit, "재고 관리 단위"),
        ];
        for (field, value, label_ko) in required {
            validate_required_name(value).map_err(|e| AppError::Validation {
                field: field.to_string(),
                message: e.to_string(),
                message_ko: format!("{}을(를) 입력해주세요", label_ko),
            })?;
        }

        validate_moq(input.moq).map_err(|e| AppError::Validation {
            field: "moq".to_string(),
            message: e.to_string(),
            message_ko: "최소 주문 수량은 1 이상이어야 합니다".to_string(),
        })?;

        validate_conversion_factor(input.conversion_factor).map_err(|e| AppError::Validation {
            field: "conversion_factor".to_string(),
            message: e.to_string(),
            message_ko: "환산 계수는 1 이상이어야 합니다".to_string(),
        })?;

        validate_safety_stock(input.safety_stock).map_err(|e| AppError::Validation {
            field: "safety_stock".to_string(),
            message: e.to_string(),
            message_ko: "안전재고는 0 이상이어야 합니다".to_string(),
        })?;

        if let Some(price) = input.order_unit_price {
            if price < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "order_unit_price".to_string(),
                    message: "Unit price cannot be negative".to_string(),
                    message_ko: "단가는 0 이상이어야 합니다".to_string(),
                });
            }
        }

        Ok(())
    }
}
