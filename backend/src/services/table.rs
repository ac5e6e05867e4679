//! Dining table service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Table service
#[derive(Clone)]
pub struct TableService {
    db: PgPool,
}

/// Table occupancy states as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "table_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DbTableStatus {
    Empty,
    Occupied,
    Reserved,
}

/// A dining table row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiningTable {
    pub id: Uuid,
    pub table_number: i32,
    pub capacity: i32,
    pub status: DbTableStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a table
#[derive(Debug, Deserialize)]
pub struct CreateTableInput {
    pub table_number: i32,
    pub capacity: i32,
}

/// Input for updating a table
#[derive(Debug, Deserialize)]
pub struct UpdateTableInput {
    pub table_number: Option<i32>,
    pub capacity: Option<i32>,
    pub status: Option<DbTableStatus>,
}

impl TableService {
    /// Create a new TableService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a table
    pub async fn create_table(&self, input: CreateTableInput) -> AppResult<DiningTable> {
        shared::validation::validate_table(input.table_number, input.capacity).map_err(|msg| {
            AppError::Validation {
                field: "table_number/capacity".to_string(),
                message: msg.to_string(),
                message_tr: "Masa numarası ve kapasite pozitif olmalıdır".to_string(),
            }
        })?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tables WHERE table_number = $1",
        )
        .bind(input.table_number)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("table number".to_string()));
        }

        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            INSERT INTO tables (table_number, capacity)
            VALUES ($1, $2)
            RETURNING id, table_number, capacity, status, created_at, updated_at
            "#,
        )
        .bind(input.table_number)
        .bind(input.capacity)
        .fetch_one(&self.db)
        .await?;

        Ok(table)
    }

    /// List tables by table number
    pub async fn list_tables(&self) -> AppResult<Vec<DiningTable>> {
        let tables = sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, table_number, capacity, status, created_at, updated_at
            FROM tables
            ORDER BY table_number
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(tables)
    }

    /// Get a table by id
    pub async fn get_table(&self, table_id: Uuid) -> AppResult<DiningTable> {
        sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, table_number, capacity, status, created_at, updated_at
            FROM tables
            WHERE id = $1
            "#,
        )
        .bind(table_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Table".to_string()))
    }

    /// Update a table's number, capacity, or status
    pub async fn update_table(
        &self,
        table_id: Uuid,
        input: UpdateTableInput,
    ) -> AppResult<DiningTable> {
        let existing = self.get_table(table_id).await?;

        let table_number = input.table_number.unwrap_or(existing.table_number);
        let capacity = input.capacity.unwrap_or(existing.capacity);
        let status = input.status.unwrap_or(existing.status);

        shared::validation::validate_table(table_number, capacity).map_err(|msg| {
            AppError::Validation {
                field: "table_number/capacity".to_string(),
                message: msg.to_string(),
                message_tr: "Masa numarası ve kapasite pozitif olmalıdır".to_string(),
            }
        })?;

        if table_number != existing.table_number {
            let duplicate = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM tables WHERE table_number = $1 AND id != $2",
            )
            .bind(table_number)
            .bind(table_id)
            .fetch_one(&self.db)
            .await?;

            if duplicate > 0 {
                return Err(AppError::DuplicateEntry("table number".to_string()));
            }
        }

        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            UPDATE tables
            SET table_number = $1, capacity = $2, status = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, table_number, capacity, status, created_at, updated_at
            "#,
        )
        .bind(table_number)
        .bind(capacity)
        .bind(status)
        .bind(table_id)
        .fetch_one(&self.db)
        .await?;

        Ok(table)
    }

    /// Delete a table. Tables with any order history are kept for reporting
    /// and cannot be removed.
    pub async fn delete_table(&self, table_id: Uuid) -> AppResult<()> {
        let has_orders = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE table_id = $1)",
        )
        .bind(table_id)
        .fetch_one(&self.db)
        .await?;

        if has_orders {
            return Err(AppError::Conflict {
                resource: "table".to_string(),
                message: "Table has order history and cannot be deleted".to_string(),
                message_tr: "Masanın sipariş geçmişi var, silinemez".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM tables WHERE id = $1")
            .bind(table_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Table".to_string()));
        }

        Ok(())
    }
}
