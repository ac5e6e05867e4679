//! HTTP handlers for stock alerts

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::UserRole;
use crate::services::alert::{AlertService, StockAlert};
use crate::AppState;

/// Query parameters for listing alerts
#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    #[serde(default)]
    pub include_resolved: bool,
}

/// Run an alert derivation pass (admin)
pub async fn refresh_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockAlert>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = AlertService::new(state.db);
    let created = service.refresh_alerts().await?;
    Ok(Json(created))
}

/// List alerts (admin)
pub async fn list_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListAlertsQuery>,
) -> AppResult<Json<Vec<StockAlert>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = AlertService::new(state.db);
    let alerts = service.list_alerts(query.include_resolved).await?;
    Ok(Json(alerts))
}

/// Acknowledge an alert (admin)
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<StockAlert>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = AlertService::new(state.db);
    let alert = service
        .acknowledge(alert_id, current_user.0.user_id)
        .await?;
    Ok(Json(alert))
}

/// Resolve an alert (admin)
pub async fn resolve_alert(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<StockAlert>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = AlertService::new(state.db);
    let alert = service.resolve(alert_id).await?;
    Ok(Json(alert))
}
