//! HTTP handlers for reporting

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    Json,
};

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::UserRole;
use crate::services::report::{DashboardMetrics, ReportService, StockValuation};
use crate::AppState;

/// Dashboard metrics (admin)
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = ReportService::new(state.db);
    let metrics = service.dashboard().await?;
    Ok(Json(metrics))
}

/// Stock valuation report (admin)
pub async fn get_stock_valuation(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockValuation>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = ReportService::new(state.db);
    let valuation = service.stock_valuation().await?;
    Ok(Json(valuation))
}

/// Download movement history as CSV (admin)
pub async fn export_movements_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<(HeaderMap, String)> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = ReportService::new(state.db);
    let rows = service.movement_export_rows().await?;
    let csv = ReportService::export_to_csv(&rows)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"stock_movements.csv\""),
    );

    Ok((headers, csv))
}
