//! Stock alert service
//!
//! Alerts are derived side information for humans. They never gate order
//! placement or any other write path.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Days before expiry at which an item starts alerting
const EXPIRY_WARNING_DAYS: i64 = 7;

/// Alert service
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

/// Alert kinds as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stock_alert_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DbAlertType {
    LowStock,
    OutOfStock,
    ExpiringSoon,
    Expired,
}

/// A stock alert row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockAlert {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub alert_type: DbAlertType,
    pub threshold_value: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub message: Option<String>,
    pub is_acknowledged: bool,
    pub acknowledged_by: Option<Uuid>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Item fields the derivation pass looks at
#[derive(Debug, FromRow)]
struct AlertCandidate {
    id: Uuid,
    name: String,
    current_stock: Decimal,
    min_stock_level: Decimal,
    expiry_date: Option<chrono::NaiveDate>,
}

const ALERT_COLUMNS: &str = "id, stock_item_id, alert_type, threshold_value, current_value, \
     message, is_acknowledged, acknowledged_by, acknowledged_at, is_resolved, resolved_at, \
     created_at";

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Derive alerts from current stock levels and expiry dates.
    ///
    /// Items that already have an open alert of the same type are skipped,
    /// so repeated refreshes do not pile up duplicates. Returns the alerts
    /// created by this pass.
    pub async fn refresh_alerts(&self) -> AppResult<Vec<StockAlert>> {
        let candidates = sqlx::query_as::<_, AlertCandidate>(
            r#"
            SELECT id, name, current_stock, min_stock_level, expiry_date
            FROM stock_items
            WHERE is_active = true
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let today = Utc::now().date_naive();
        let mut created = Vec::new();

        for item in &candidates {
            let mut triggered: Vec<(DbAlertType, Option<Decimal>, String)> = Vec::new();

            if item.current_stock <= Decimal::ZERO {
                triggered.push((
                    DbAlertType::OutOfStock,
                    Some(Decimal::ZERO),
                    format!("{} is out of stock", item.name),
                ));
            } else if item.current_stock <= item.min_stock_level {
                triggered.push((
                    DbAlertType::LowStock,
                    Some(item.min_stock_level),
                    format!("{} is below its minimum level", item.name),
                ));
            }

            if let Some(expiry) = item.expiry_date {
                if expiry < today {
                    triggered.push((
                        DbAlertType::Expired,
                        None,
                        format!("{} expired on {}", item.name, expiry),
                    ));
                } else if (expiry - today).num_days() <= EXPIRY_WARNING_DAYS {
                    triggered.push((
                        DbAlertType::ExpiringSoon,
                        None,
                        format!("{} expires on {}", item.name, expiry),
                    ));
                }
            }

            for (alert_type, threshold, message) in triggered {
                let alert = sqlx::query_as::<_, StockAlert>(&format!(
                    r#"
                    INSERT INTO stock_alerts (stock_item_id, alert_type, threshold_value,
                                              current_value, message)
                    SELECT $1, $2, $3, $4, $5
                    WHERE NOT EXISTS (
                        SELECT 1 FROM stock_alerts
                        WHERE stock_item_id = $1 AND alert_type = $2 AND is_resolved = false
                    )
                    RETURNING {ALERT_COLUMNS}
                    "#,
                ))
                .bind(item.id)
                .bind(alert_type)
                .bind(threshold)
                .bind(item.current_stock)
                .bind(&message)
                .fetch_optional(&self.db)
                .await?;

                if let Some(alert) = alert {
                    created.push(alert);
                }
            }
        }

        Ok(created)
    }

    /// List alerts, open ones by default
    pub async fn list_alerts(&self, include_resolved: bool) -> AppResult<Vec<StockAlert>> {
        let alerts = sqlx::query_as::<_, StockAlert>(&format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM stock_alerts
            WHERE is_resolved = false OR $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(include_resolved)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Acknowledge an open alert
    pub async fn acknowledge(&self, alert_id: Uuid, user_id: Uuid) -> AppResult<StockAlert> {
        sqlx::query_as::<_, StockAlert>(&format!(
            r#"
            UPDATE stock_alerts
            SET is_acknowledged = true, acknowledged_by = $1, acknowledged_at = NOW()
            WHERE id = $2 AND is_resolved = false
            RETURNING {ALERT_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(alert_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert".to_string()))
    }

    /// Resolve an alert
    pub async fn resolve(&self, alert_id: Uuid) -> AppResult<StockAlert> {
        sqlx::query_as::<_, StockAlert>(&format!(
            r#"
            UPDATE stock_alerts
            SET is_resolved = true, resolved_at = NOW()
            WHERE id = $1 AND is_resolved = false
            RETURNING {ALERT_COLUMNS}
            "#,
        ))
        .bind(alert_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Alert".to_string()))
    }
}
