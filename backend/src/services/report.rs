//! Reporting service: dashboard metrics, stock valuation, CSV export

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Headline numbers for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub todays_revenue: Decimal,
    pub todays_completed_orders: i64,
    pub open_orders: i64,
    pub occupied_tables: i64,
    pub critical_stock_items: i64,
    pub open_alerts: i64,
}

/// Valuation of one stock item at its current unit cost
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockValuation {
    pub stock_item_id: Uuid,
    pub name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub unit_cost: Decimal,
    pub total_value: Decimal,
}

/// A movement row flattened for CSV export
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovementExportRow {
    pub created_at: DateTime<Utc>,
    pub stock_item_name: String,
    pub movement_type: String,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Compute dashboard metrics
    pub async fn dashboard(&self) -> AppResult<DashboardMetrics> {
        let (todays_revenue, todays_completed_orders) =
            sqlx::query_as::<_, (Decimal, i64)>(
                r#"
                SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
                FROM orders
                WHERE status = 'completed' AND created_at::date = CURRENT_DATE
                "#,
            )
            .fetch_one(&self.db)
            .await?;

        let open_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE status IN ('active', 'ready')",
        )
        .fetch_one(&self.db)
        .await?;

        let occupied_tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tables WHERE status = 'occupied'",
        )
        .fetch_one(&self.db)
        .await?;

        let critical_stock_items: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_items
            WHERE current_stock <= min_stock_level AND is_active = true
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let open_alerts: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_alerts WHERE is_resolved = false",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            todays_revenue,
            todays_completed_orders,
            open_orders,
            occupied_tables,
            critical_stock_items,
            open_alerts,
        })
    }

    /// Current stock valued at unit cost, per item
    pub async fn stock_valuation(&self) -> AppResult<Vec<StockValuation>> {
        let rows = sqlx::query_as::<_, StockValuation>(
            r#"
            SELECT id AS stock_item_id, name, unit, current_stock, unit_cost,
                   current_stock * unit_cost AS total_value
            FROM stock_items
            WHERE is_active = true
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Movement history flattened for export, newest first
    pub async fn movement_export_rows(&self) -> AppResult<Vec<MovementExportRow>> {
        let rows = sqlx::query_as::<_, MovementExportRow>(
            r#"
            SELECT sm.created_at, si.name AS stock_item_name, sm.movement_type::text,
                   sm.quantity, sm.previous_stock, sm.new_stock,
                   sm.reference_type::text, sm.notes
            FROM stock_movements sm
            JOIN stock_items si ON si.id = sm.stock_item_id
            ORDER BY sm.created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
