//! HTTP handlers for table management

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::UserRole;
use crate::services::table::{CreateTableInput, DiningTable, TableService, UpdateTableInput};
use crate::AppState;

/// Create a table (admin)
pub async fn create_table(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTableInput>,
) -> AppResult<Json<DiningTable>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = TableService::new(state.db);
    let table = service.create_table(input).await?;
    Ok(Json(table))
}

/// List tables
pub async fn list_tables(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<DiningTable>>> {
    let service = TableService::new(state.db);
    let tables = service.list_tables().await?;
    Ok(Json(tables))
}

/// Get a table
pub async fn get_table(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(table_id): Path<Uuid>,
) -> AppResult<Json<DiningTable>> {
    let service = TableService::new(state.db);
    let table = service.get_table(table_id).await?;
    Ok(Json(table))
}

/// Update a table (waiters adjust status, admins everything)
pub async fn update_table(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(table_id): Path<Uuid>,
    Json(input): Json<UpdateTableInput>,
) -> AppResult<Json<DiningTable>> {
    require_role(&current_user.0, UserRole::Waiter)?;
    let service = TableService::new(state.db);
    let table = service.update_table(table_id, input).await?;
    Ok(Json(table))
}

/// Delete a table (admin)
pub async fn delete_table(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(table_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = TableService::new(state.db);
    service.delete_table(table_id).await?;
    Ok(Json(()))
}
