//! Menu category service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// A menu category row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub display_order: Option<i32>,
}

/// Input for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a menu category
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, color, display_order)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, color, display_order, is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.color.unwrap_or_else(|| "#3B82F6".to_string()))
        .bind(input.display_order.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// List categories in display order
    pub async fn list_categories(&self, include_inactive: bool) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, color, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE is_active = true OR $1
            ORDER BY display_order, name
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Update a category
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let existing = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, color, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, description = $2, color = $3, display_order = $4, is_active = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, description, color, display_order, is_active, created_at, updated_at
            "#,
        )
        .bind(input.name.unwrap_or(existing.name))
        .bind(input.description.or(existing.description))
        .bind(input.color.unwrap_or(existing.color))
        .bind(input.display_order.unwrap_or(existing.display_order))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// Deactivate a category. Products keep their category link so the menu
    /// can be restored.
    pub async fn deactivate_category(&self, category_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE categories SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(category_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }
}
