//! Stock accounting service
//!
//! Owns the stock item catalog, the append-only movement ledger, order
//! availability checks, and the depletion/restoration flows tied to the
//! order lifecycle. `current_stock` is a materialized aggregate: every
//! change goes through a movement row written in the same transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    aggregate_requirements, check_requirements, production_capacity, OrderLine,
    ProductionCapacity, StockCheck, StockRequirement,
};
use crate::services::recipe::RecipeService;

/// Stock service for items, movements, and order stock accounting
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        }
    }
}

/// What caused a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stock_reference_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Order,
    OrderCancel,
    Purchase,
    Manual,
    Usage,
    Waste,
    Expired,
    Return,
    Transfer,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Order => "order",
            ReferenceType::OrderCancel => "order_cancel",
            ReferenceType::Purchase => "purchase",
            ReferenceType::Manual => "manual",
            ReferenceType::Usage => "usage",
            ReferenceType::Waste => "waste",
            ReferenceType::Expired => "expired",
            ReferenceType::Return => "return",
            ReferenceType::Transfer => "transfer",
        }
    }
}

/// A tracked stock item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub unit: String,
    pub min_stock_level: Decimal,
    pub max_stock_level: Decimal,
    pub current_stock: Decimal,
    pub unit_cost: Decimal,
    pub supplier: Option<String>,
    pub barcode: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable ledger entry. Movements are only ever inserted; corrections
/// are new compensating rows.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub unit_cost: Decimal,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A grouping category for stock items
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a stock item
#[derive(Debug, Deserialize)]
pub struct CreateStockItemInput {
    pub name: String,
    pub category_id: Option<Uuid>,
    pub unit: String,
    pub min_stock_level: Option<Decimal>,
    pub max_stock_level: Option<Decimal>,
    pub initial_stock: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub supplier: Option<String>,
    pub barcode: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Input for updating a stock item. Stock levels are not editable here;
/// `current_stock` changes only through movements.
#[derive(Debug, Deserialize)]
pub struct UpdateStockItemInput {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit: Option<String>,
    pub min_stock_level: Option<Decimal>,
    pub max_stock_level: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub supplier: Option<String>,
    pub barcode: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for recording a manual stock movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub stock_item_id: Uuid,
    pub movement_type: MovementType,
    /// For `in`/`out`: the magnitude to add or remove.
    /// For `adjustment`: the new absolute stock level.
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Input for creating a stock category
#[derive(Debug, Deserialize)]
pub struct CreateStockCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Input for updating a stock category
#[derive(Debug, Deserialize)]
pub struct UpdateStockCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

/// Result of checking the ledger against the materialized stock level
#[derive(Debug, Clone, Serialize)]
pub struct StockReconciliation {
    pub stock_item_id: Uuid,
    pub current_stock: Decimal,
    pub ledger_total: Decimal,
    pub drift: Decimal,
}

const STOCK_ITEM_COLUMNS: &str = "id, name, category_id, unit, min_stock_level, max_stock_level, \
     current_stock, unit_cost, supplier, barcode, expiry_date, location, description, is_active, \
     created_at, updated_at";

const MOVEMENT_COLUMNS: &str = "id, stock_item_id, movement_type, quantity, previous_stock, \
     new_stock, unit_cost, reference_type, reference_id, user_id, notes, created_at";

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Stock items
    // ========================================================================

    /// Create a stock item. A non-zero initial stock is recorded as an
    /// opening `in` movement so the ledger replays to the materialized level.
    pub async fn create_item(
        &self,
        user_id: Uuid,
        input: CreateStockItemInput,
    ) -> AppResult<StockItem> {
        let min_level = input.min_stock_level.unwrap_or(Decimal::ZERO);
        let max_level = input.max_stock_level.unwrap_or(Decimal::ZERO);
        let initial_stock = input.initial_stock.unwrap_or(Decimal::ZERO);
        let unit_cost = input.unit_cost.unwrap_or(Decimal::ZERO);

        shared::validation::validate_stock_levels(min_level, max_level).map_err(|msg| {
            AppError::Validation {
                field: "min_stock_level/max_stock_level".to_string(),
                message: msg.to_string(),
                message_tr: "Stok seviyeleri geçersiz".to_string(),
            }
        })?;

        shared::validation::validate_unit_cost(unit_cost).map_err(|msg| AppError::Validation {
            field: "unit_cost".to_string(),
            message: msg.to_string(),
            message_tr: "Birim maliyet negatif olamaz".to_string(),
        })?;

        if initial_stock < Decimal::ZERO {
            return Err(AppError::InvalidQuantity(
                "Initial stock cannot be negative".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let item = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            INSERT INTO stock_items (name, category_id, unit, min_stock_level, max_stock_level,
                                     current_stock, unit_cost, supplier, barcode, expiry_date,
                                     location, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {STOCK_ITEM_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(input.category_id)
        .bind(&input.unit)
        .bind(min_level)
        .bind(max_level)
        .bind(initial_stock)
        .bind(unit_cost)
        .bind(&input.supplier)
        .bind(&input.barcode)
        .bind(input.expiry_date)
        .bind(&input.location)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        if initial_stock > Decimal::ZERO {
            sqlx::query(
                r#"
                INSERT INTO stock_movements (stock_item_id, movement_type, quantity,
                                             previous_stock, new_stock, unit_cost,
                                             reference_type, user_id, notes)
                VALUES ($1, 'in', $2, 0, $2, $3, 'manual', $4, 'Opening stock')
                "#,
            )
            .bind(item.id)
            .bind(initial_stock)
            .bind(unit_cost)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(item)
    }

    /// Update a stock item's descriptive fields
    pub async fn update_item(
        &self,
        item_id: Uuid,
        input: UpdateStockItemInput,
    ) -> AppResult<StockItem> {
        let existing = self.get_item(item_id).await?;

        let min_level = input.min_stock_level.unwrap_or(existing.min_stock_level);
        let max_level = input.max_stock_level.unwrap_or(existing.max_stock_level);
        let unit_cost = input.unit_cost.unwrap_or(existing.unit_cost);

        shared::validation::validate_stock_levels(min_level, max_level).map_err(|msg| {
            AppError::Validation {
                field: "min_stock_level/max_stock_level".to_string(),
                message: msg.to_string(),
                message_tr: "Stok seviyeleri geçersiz".to_string(),
            }
        })?;

        shared::validation::validate_unit_cost(unit_cost).map_err(|msg| AppError::Validation {
            field: "unit_cost".to_string(),
            message: msg.to_string(),
            message_tr: "Birim maliyet negatif olamaz".to_string(),
        })?;

        let item = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            UPDATE stock_items
            SET name = $1, category_id = $2, unit = $3, min_stock_level = $4,
                max_stock_level = $5, unit_cost = $6, supplier = $7, barcode = $8,
                expiry_date = $9, location = $10, description = $11, is_active = $12,
                updated_at = NOW()
            WHERE id = $13
            RETURNING {STOCK_ITEM_COLUMNS}
            "#,
        ))
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.category_id.or(existing.category_id))
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(min_level)
        .bind(max_level)
        .bind(unit_cost)
        .bind(input.supplier.or(existing.supplier))
        .bind(input.barcode.or(existing.barcode))
        .bind(input.expiry_date.or(existing.expiry_date))
        .bind(input.location.or(existing.location))
        .bind(input.description.or(existing.description))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    /// Get a stock item by id
    pub async fn get_item(&self, item_id: Uuid) -> AppResult<StockItem> {
        sqlx::query_as::<_, StockItem>(&format!(
            "SELECT {STOCK_ITEM_COLUMNS} FROM stock_items WHERE id = $1",
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock item".to_string()))
    }

    /// List stock items, active ones by default
    pub async fn list_items(&self, include_inactive: bool) -> AppResult<Vec<StockItem>> {
        let items = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            SELECT {STOCK_ITEM_COLUMNS}
            FROM stock_items
            WHERE is_active = true OR $1
            ORDER BY name
            "#,
        ))
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    /// Deactivate a stock item (movement history is preserved)
    pub async fn deactivate_item(&self, item_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE stock_items SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(item_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock item".to_string()));
        }

        Ok(())
    }

    // ========================================================================
    // Movement ledger
    // ========================================================================

    /// Record a manual stock movement (purchase receipt, waste, correction).
    ///
    /// The movement row and the materialized `current_stock` are written in
    /// one transaction; an `out` that would overdraw the item is rejected.
    pub async fn record_movement(
        &self,
        user_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<StockMovement> {
        match input.movement_type {
            MovementType::In | MovementType::Out => {
                if input.quantity <= Decimal::ZERO {
                    return Err(AppError::InvalidQuantity(
                        "Quantity must be positive".to_string(),
                    ));
                }
            }
            MovementType::Adjustment => {
                if input.quantity < Decimal::ZERO {
                    return Err(AppError::InvalidQuantity(
                        "Adjusted stock level cannot be negative".to_string(),
                    ));
                }
            }
        }

        let item = self.get_item(input.stock_item_id).await?;

        let mut tx = self.db.begin().await?;

        let new_stock = match input.movement_type {
            MovementType::In => sqlx::query_scalar::<_, Decimal>(
                r#"
                UPDATE stock_items
                SET current_stock = current_stock + $1, updated_at = NOW()
                WHERE id = $2
                RETURNING current_stock
                "#,
            )
            .bind(input.quantity)
            .bind(input.stock_item_id)
            .fetch_one(&mut *tx)
            .await?,
            MovementType::Out => {
                // Conditional decrement: zero affected rows means the item
                // no longer has enough stock, and nothing is written.
                let updated = sqlx::query_scalar::<_, Decimal>(
                    r#"
                    UPDATE stock_items
                    SET current_stock = current_stock - $1, updated_at = NOW()
                    WHERE id = $2 AND current_stock >= $1
                    RETURNING current_stock
                    "#,
                )
                .bind(input.quantity)
                .bind(input.stock_item_id)
                .fetch_optional(&mut *tx)
                .await?;

                match updated {
                    Some(stock) => stock,
                    None => {
                        return Err(AppError::InsufficientStock {
                            items: vec![StockRequirement {
                                stock_item_id: item.id,
                                stock_item_name: item.name,
                                unit: item.unit,
                                quantity_needed: input.quantity,
                                current_stock: item.current_stock,
                                is_critical: item.current_stock <= Decimal::ZERO,
                            }],
                        });
                    }
                }
            }
            MovementType::Adjustment => sqlx::query_scalar::<_, Decimal>(
                r#"
                UPDATE stock_items
                SET current_stock = $1, updated_at = NOW()
                WHERE id = $2
                RETURNING current_stock
                "#,
            )
            .bind(input.quantity)
            .bind(input.stock_item_id)
            .fetch_one(&mut *tx)
            .await?,
        };

        let previous_stock = match input.movement_type {
            MovementType::In => new_stock - input.quantity,
            MovementType::Out => new_stock + input.quantity,
            MovementType::Adjustment => item.current_stock,
        };

        // The ledger records magnitudes; for adjustments that is the size of
        // the correction, not the new absolute level.
        let magnitude = match input.movement_type {
            MovementType::Adjustment => (new_stock - previous_stock).abs(),
            _ => input.quantity,
        };

        let movement = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            INSERT INTO stock_movements (stock_item_id, movement_type, quantity, previous_stock,
                                         new_stock, unit_cost, reference_type, reference_id,
                                         user_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {MOVEMENT_COLUMNS}
            "#,
        ))
        .bind(input.stock_item_id)
        .bind(input.movement_type)
        .bind(magnitude)
        .bind(previous_stock)
        .bind(new_stock)
        .bind(input.unit_cost.unwrap_or(item.unit_cost))
        .bind(input.reference_type.unwrap_or(ReferenceType::Manual))
        .bind(input.reference_id)
        .bind(user_id)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Movement history for a stock item, newest first
    pub async fn movements_for_item(&self, item_id: Uuid) -> AppResult<Vec<StockMovement>> {
        let item_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM stock_items WHERE id = $1)")
                .bind(item_id)
                .fetch_one(&self.db)
                .await?;

        if !item_exists {
            return Err(AppError::NotFound("Stock item".to_string()));
        }

        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE stock_item_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Movements written for one reference (e.g. all entries of an order)
    pub async fn movements_for_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE reference_type = $1 AND reference_id = $2
            ORDER BY created_at
            "#,
        ))
        .bind(reference_type)
        .bind(reference_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    // ========================================================================
    // Availability and capacity
    // ========================================================================

    /// Check whether current stock covers a set of order lines.
    ///
    /// Requirements that share a stock item across lines are summed, so the
    /// reported draw reflects the whole order. This is a pure read: no stock
    /// value is mutated.
    pub async fn check_availability(&self, lines: &[OrderLine]) -> AppResult<StockCheck> {
        let recipe_service = RecipeService::new(self.db.clone());

        let mut resolved = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity == 0 {
                return Err(AppError::InvalidQuantity(
                    "Order quantity must be at least 1".to_string(),
                ));
            }

            let recipe = recipe_service.get_recipe(line.product_id).await?;
            for ingredient in &recipe {
                if ingredient.quantity_needed <= Decimal::ZERO {
                    return Err(AppError::InvalidQuantity(format!(
                        "Recipe for ingredient {} has a non-positive quantity",
                        ingredient.stock_item_name
                    )));
                }
            }

            resolved.push((line.quantity, recipe));
        }

        Ok(check_requirements(aggregate_requirements(&resolved)))
    }

    /// Producible portions of a product given its recipe and live stock
    pub async fn production_capacity_for(&self, product_id: Uuid) -> AppResult<ProductionCapacity> {
        let recipe_service = RecipeService::new(self.db.clone());
        let recipe = recipe_service.get_recipe(product_id).await?;

        production_capacity(&recipe).map_err(|msg| AppError::InvalidQuantity(msg.to_string()))
    }

    // ========================================================================
    // Order depletion and restoration
    // ========================================================================

    /// Deduct stock for a confirmed order.
    ///
    /// Availability is checked first; on shortfall the order is rejected
    /// with the under-supplied ingredients and nothing is written. The
    /// deduction itself runs in a single transaction with one conditional
    /// decrement per aggregated requirement, so a concurrent order racing
    /// past the check still cannot overdraw an ingredient: the decrement
    /// that would go negative affects zero rows and the whole order rolls
    /// back.
    pub async fn deduct_for_order(
        &self,
        lines: &[OrderLine],
        order_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        let check = self.check_availability(lines).await?;

        if !check.can_fulfill {
            return Err(AppError::InsufficientStock {
                items: check.insufficient_items,
            });
        }

        let mut tx = self.db.begin().await?;

        let mut movements = Vec::with_capacity(check.requirements.len());
        for requirement in &check.requirements {
            let updated = sqlx::query_as::<_, (Decimal, Decimal)>(
                r#"
                UPDATE stock_items
                SET current_stock = current_stock - $1, updated_at = NOW()
                WHERE id = $2 AND current_stock >= $1
                RETURNING current_stock, unit_cost
                "#,
            )
            .bind(requirement.quantity_needed)
            .bind(requirement.stock_item_id)
            .fetch_optional(&mut *tx)
            .await?;

            let (new_stock, unit_cost) = match updated {
                Some(row) => row,
                // A concurrent movement consumed the stock between the check
                // and this decrement; dropping the transaction rolls back
                // every decrement already applied for this order.
                None => {
                    return Err(AppError::InsufficientStock {
                        items: vec![requirement.clone()],
                    });
                }
            };

            let movement = sqlx::query_as::<_, StockMovement>(&format!(
                r#"
                INSERT INTO stock_movements (stock_item_id, movement_type, quantity,
                                             previous_stock, new_stock, unit_cost,
                                             reference_type, reference_id, user_id, notes)
                VALUES ($1, 'out', $2, $3, $4, $5, 'order', $6, $7, $8)
                RETURNING {MOVEMENT_COLUMNS}
                "#,
            ))
            .bind(requirement.stock_item_id)
            .bind(requirement.quantity_needed)
            .bind(new_stock + requirement.quantity_needed)
            .bind(new_stock)
            .bind(unit_cost)
            .bind(order_id)
            .bind(user_id)
            .bind(format!("Stock deduction for order {}", order_id))
            .fetch_one(&mut *tx)
            .await?;

            movements.push(movement);
        }

        tx.commit().await?;

        Ok(movements)
    }

    /// Restore stock for a cancelled order by replaying its `out` movements
    /// as compensating `in` movements.
    ///
    /// The quantity to restore comes from the original ledger entries, but
    /// it is applied on top of whatever the stock level is now, so unrelated
    /// movements made in between are respected. Calling this twice for the
    /// same order is a no-op: the existing compensation is returned.
    pub async fn restore_for_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE reference_type = 'order_cancel' AND reference_id = $1
            ORDER BY created_at
            "#,
        ))
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        if !existing.is_empty() {
            return Ok(existing);
        }

        let deductions = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM stock_movements
            WHERE reference_type = 'order' AND reference_id = $1 AND movement_type = 'out'
            ORDER BY created_at
            "#,
        ))
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut restored = Vec::with_capacity(deductions.len());
        for deduction in &deductions {
            let new_stock = sqlx::query_scalar::<_, Decimal>(
                r#"
                UPDATE stock_items
                SET current_stock = current_stock + $1, updated_at = NOW()
                WHERE id = $2
                RETURNING current_stock
                "#,
            )
            .bind(deduction.quantity)
            .bind(deduction.stock_item_id)
            .fetch_one(&mut *tx)
            .await?;

            let movement = sqlx::query_as::<_, StockMovement>(&format!(
                r#"
                INSERT INTO stock_movements (stock_item_id, movement_type, quantity,
                                             previous_stock, new_stock, unit_cost,
                                             reference_type, reference_id, user_id, notes)
                VALUES ($1, 'in', $2, $3, $4, $5, 'order_cancel', $6, $7, $8)
                RETURNING {MOVEMENT_COLUMNS}
                "#,
            ))
            .bind(deduction.stock_item_id)
            .bind(deduction.quantity)
            .bind(new_stock - deduction.quantity)
            .bind(new_stock)
            .bind(deduction.unit_cost)
            .bind(order_id)
            .bind(user_id)
            .bind(format!("Stock restored for cancelled order {}", order_id))
            .fetch_one(&mut *tx)
            .await?;

            restored.push(movement);
        }

        tx.commit().await?;

        Ok(restored)
    }

    // ========================================================================
    // Alert feed and reconciliation
    // ========================================================================

    /// Items at or below their minimum level, tightest first. Informational
    /// only: this never gates an order.
    pub async fn critical_items(&self) -> AppResult<Vec<StockRequirement>> {
        let items = sqlx::query_as::<_, StockItem>(&format!(
            r#"
            SELECT {STOCK_ITEM_COLUMNS}
            FROM stock_items
            WHERE current_stock <= min_stock_level AND is_active = true
            ORDER BY current_stock
            "#,
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(items
            .into_iter()
            .map(|item| StockRequirement {
                stock_item_id: item.id,
                stock_item_name: item.name,
                unit: item.unit,
                quantity_needed: item.min_stock_level,
                current_stock: item.current_stock,
                is_critical: item.current_stock <= Decimal::ZERO,
            })
            .collect())
    }

    /// Verify that the materialized `current_stock` equals the ledger replay
    /// for an item. `in` adds, `out` subtracts, adjustments contribute their
    /// signed delta.
    pub async fn reconcile_item(&self, item_id: Uuid) -> AppResult<StockReconciliation> {
        let item = self.get_item(item_id).await?;

        let ledger_total = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(CASE
                WHEN movement_type = 'in' THEN quantity
                WHEN movement_type = 'out' THEN -quantity
                ELSE new_stock - previous_stock
            END)
            FROM stock_movements
            WHERE stock_item_id = $1
            "#,
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?
        .unwrap_or(Decimal::ZERO);

        Ok(StockReconciliation {
            stock_item_id: item.id,
            current_stock: item.current_stock,
            ledger_total,
            drift: item.current_stock - ledger_total,
        })
    }

    // ========================================================================
    // Stock categories
    // ========================================================================

    /// Create a stock category
    pub async fn create_category(
        &self,
        input: CreateStockCategoryInput,
    ) -> AppResult<StockCategory> {
        let category = sqlx::query_as::<_, StockCategory>(
            r#"
            INSERT INTO stock_categories (name, description, color, icon)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, color, icon, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.color.unwrap_or_else(|| "#6B7280".to_string()))
        .bind(input.icon.unwrap_or_else(|| "package".to_string()))
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// Update a stock category
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: UpdateStockCategoryInput,
    ) -> AppResult<StockCategory> {
        let existing = sqlx::query_as::<_, StockCategory>(
            r#"
            SELECT id, name, description, color, icon, is_active, created_at, updated_at
            FROM stock_categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock category".to_string()))?;

        let category = sqlx::query_as::<_, StockCategory>(
            r#"
            UPDATE stock_categories
            SET name = $1, description = $2, color = $3, icon = $4, is_active = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, description, color, icon, is_active, created_at, updated_at
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.description.or(existing.description))
        .bind(input.color.unwrap_or(existing.color))
        .bind(input.icon.unwrap_or(existing.icon))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// List active stock categories
    pub async fn list_categories(&self) -> AppResult<Vec<StockCategory>> {
        let categories = sqlx::query_as::<_, StockCategory>(
            r#"
            SELECT id, name, description, color, icon, is_active, created_at, updated_at
            FROM stock_categories
            WHERE is_active = true
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Delete a stock category; items keep their history and lose the link
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stock_categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock category".to_string()));
        }

        Ok(())
    }
}
