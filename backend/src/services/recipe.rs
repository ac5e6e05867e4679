//! Product recipe service: resolving and editing bills of materials

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::RecipeIngredient;

/// Recipe service for product ingredient lists
#[derive(Clone)]
pub struct RecipeService {
    db: PgPool,
}

/// A stored recipe row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductRecipe {
    pub id: Uuid,
    pub product_id: Uuid,
    pub stock_item_id: Uuid,
    pub quantity_needed: Decimal,
    pub unit: String,
    pub is_critical: bool,
    pub cost_percentage: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of a recipe being saved
#[derive(Debug, Deserialize)]
pub struct RecipeLineInput {
    pub stock_item_id: Uuid,
    pub quantity_needed: Decimal,
    pub unit: String,
    pub is_critical: Option<bool>,
    pub cost_percentage: Option<Decimal>,
}

/// Row for the resolved-recipe query
#[derive(Debug, FromRow)]
struct IngredientRow {
    stock_item_id: Uuid,
    stock_item_name: String,
    unit: String,
    quantity_needed: Decimal,
    current_stock: Decimal,
    is_critical: bool,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve the ingredient requirements for one unit of a product,
    /// each carrying the live stock of that ingredient.
    ///
    /// A product with no recipe rows resolves to an empty list, which
    /// callers must treat as unconstrained production.
    pub async fn get_recipe(&self, product_id: Uuid) -> AppResult<Vec<RecipeIngredient>> {
        let rows = sqlx::query_as::<_, IngredientRow>(
            r#"
            SELECT pr.stock_item_id, si.name AS stock_item_name, pr.unit,
                   pr.quantity_needed, si.current_stock, pr.is_critical
            FROM product_recipes pr
            JOIN stock_items si ON si.id = pr.stock_item_id
            WHERE pr.product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RecipeIngredient {
                stock_item_id: r.stock_item_id,
                stock_item_name: r.stock_item_name,
                unit: r.unit,
                quantity_needed: r.quantity_needed,
                current_stock: r.current_stock,
                is_critical: r.is_critical,
            })
            .collect())
    }

    /// List the stored recipe rows for a product (for the recipe editor)
    pub async fn list_rows(&self, product_id: Uuid) -> AppResult<Vec<ProductRecipe>> {
        let rows = sqlx::query_as::<_, ProductRecipe>(
            r#"
            SELECT id, product_id, stock_item_id, quantity_needed, unit, is_critical,
                   cost_percentage, created_at, updated_at
            FROM product_recipes
            WHERE product_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Replace a product's recipe with the given rows.
    ///
    /// The editor saves the whole ingredient list at once, so this deletes
    /// the existing rows and inserts the new set in one transaction.
    pub async fn set_recipe(
        &self,
        product_id: Uuid,
        lines: Vec<RecipeLineInput>,
    ) -> AppResult<Vec<ProductRecipe>> {
        // Validate product exists
        let product_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        // Validate quantities and referenced stock items up front
        for line in &lines {
            if line.quantity_needed <= Decimal::ZERO {
                return Err(AppError::InvalidQuantity(
                    "Recipe quantity must be positive".to_string(),
                ));
            }

            let item_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM stock_items WHERE id = $1)",
            )
            .bind(line.stock_item_id)
            .fetch_one(&self.db)
            .await?;

            if !item_exists {
                return Err(AppError::NotFound("Stock item".to_string()));
            }
        }

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM product_recipes WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(lines.len());
        for line in &lines {
            let row = sqlx::query_as::<_, ProductRecipe>(
                r#"
                INSERT INTO product_recipes (product_id, stock_item_id, quantity_needed, unit,
                                             is_critical, cost_percentage)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, product_id, stock_item_id, quantity_needed, unit, is_critical,
                          cost_percentage, created_at, updated_at
                "#,
            )
            .bind(product_id)
            .bind(line.stock_item_id)
            .bind(line.quantity_needed)
            .bind(&line.unit)
            .bind(line.is_critical.unwrap_or(false))
            .bind(line.cost_percentage.unwrap_or(Decimal::ZERO))
            .fetch_one(&mut *tx)
            .await?;

            saved.push(row);
        }

        tx.commit().await?;

        Ok(saved)
    }
}
