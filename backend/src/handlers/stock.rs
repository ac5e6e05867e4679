//! HTTP handlers for stock administration

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::{StockRequirement, UserRole};
use crate::services::stock::{
    CreateStockCategoryInput, CreateStockItemInput, RecordMovementInput, StockCategory,
    StockItem, StockMovement, StockReconciliation, StockService, UpdateStockCategoryInput,
    UpdateStockItemInput,
};
use crate::AppState;

/// Query parameters for listing stock items
#[derive(Debug, Deserialize)]
pub struct ListStockItemsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create a stock item (admin)
pub async fn create_stock_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStockItemInput>,
) -> AppResult<Json<StockItem>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let item = service.create_item(current_user.0.user_id, input).await?;
    Ok(Json(item))
}

/// List stock items (admin)
pub async fn list_stock_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListStockItemsQuery>,
) -> AppResult<Json<Vec<StockItem>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let items = service.list_items(query.include_inactive).await?;
    Ok(Json(items))
}

/// Get a stock item (admin)
pub async fn get_stock_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<StockItem>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let item = service.get_item(item_id).await?;
    Ok(Json(item))
}

/// Update a stock item (admin)
pub async fn update_stock_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateStockItemInput>,
) -> AppResult<Json<StockItem>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let item = service.update_item(item_id, input).await?;
    Ok(Json(item))
}

/// Deactivate a stock item (admin)
pub async fn deactivate_stock_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    service.deactivate_item(item_id).await?;
    Ok(Json(()))
}

/// Record a manual stock movement (admin)
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<Json<StockMovement>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let movement = service
        .record_movement(current_user.0.user_id, input)
        .await?;
    Ok(Json(movement))
}

/// Movement history for a stock item (admin)
pub async fn get_item_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let movements = service.movements_for_item(item_id).await?;
    Ok(Json(movements))
}

/// Items at or below their minimum level
pub async fn get_critical_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockRequirement>>> {
    let service = StockService::new(state.db);
    let items = service.critical_items().await?;
    Ok(Json(items))
}

/// Check the ledger against the materialized stock level (admin)
pub async fn reconcile_stock_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<StockReconciliation>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let reconciliation = service.reconcile_item(item_id).await?;
    Ok(Json(reconciliation))
}

/// Create a stock category (admin)
pub async fn create_stock_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStockCategoryInput>,
) -> AppResult<Json<StockCategory>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let category = service.create_category(input).await?;
    Ok(Json(category))
}

/// List stock categories (admin)
pub async fn list_stock_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockCategory>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let categories = service.list_categories().await?;
    Ok(Json(categories))
}

/// Update a stock category (admin)
pub async fn update_stock_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateStockCategoryInput>,
) -> AppResult<Json<StockCategory>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a stock category (admin)
pub async fn delete_stock_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = StockService::new(state.db);
    service.delete_category(category_id).await?;
    Ok(Json(()))
}
