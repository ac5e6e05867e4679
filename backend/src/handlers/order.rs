//! HTTP handlers for the order lifecycle

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::{OrderLine, StockCheck, UserRole};
use crate::services::order::{
    CompleteOrderInput, CreateOrderInput, DbOrderItemStatus, DbOrderStatus, Order, OrderService,
    OrderItem, OrderWithItems,
};
use crate::services::stock::StockService;
use crate::AppState;

/// Query parameters for listing orders
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<DbOrderStatus>,
}

/// Request body for a pre-submit availability check
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub items: Vec<OrderLine>,
}

/// Request body for updating an order item's kitchen status
#[derive(Debug, Deserialize)]
pub struct UpdateItemStatusRequest {
    pub status: DbOrderItemStatus,
}

/// Create an order (waiter)
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, UserRole::Waiter)?;
    let service = OrderService::new(state.db);
    let order = service.create_order(current_user.0.user_id, input).await?;
    Ok(Json(order))
}

/// Optional pre-check: would current stock cover these lines?
pub async fn check_availability(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<AvailabilityRequest>,
) -> AppResult<Json<StockCheck>> {
    let service = StockService::new(state.db);
    let check = service.check_availability(&input.items).await?;
    Ok(Json(check))
}

/// List orders
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders(query.status).await?;
    Ok(Json(orders))
}

/// Get an order with its items
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// Mark an order ready (kitchen)
pub async fn mark_order_ready(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    require_role(&current_user.0, UserRole::Kitchen)?;
    let service = OrderService::new(state.db);
    let order = service.mark_ready(order_id).await?;
    Ok(Json(order))
}

/// Complete an order with payment (waiter)
pub async fn complete_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<CompleteOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, UserRole::Waiter)?;
    let service = OrderService::new(state.db);
    let order = service
        .complete_order(order_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(order))
}

/// Cancel an order (waiter)
pub async fn cancel_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    require_role(&current_user.0, UserRole::Waiter)?;
    let service = OrderService::new(state.db);
    let order = service
        .cancel_order(order_id, current_user.0.user_id)
        .await?;
    Ok(Json(order))
}

/// Update the kitchen status of one order item (kitchen)
pub async fn update_item_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((order_id, item_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateItemStatusRequest>,
) -> AppResult<Json<OrderItem>> {
    require_role(&current_user.0, UserRole::Kitchen)?;
    let service = OrderService::new(state.db);
    let item = service
        .update_item_status(order_id, item_id, input.status)
        .await?;
    Ok(Json(item))
}
