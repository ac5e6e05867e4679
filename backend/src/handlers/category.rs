//! HTTP handlers for menu categories

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::UserRole;
use crate::services::category::{
    Category, CategoryService, CreateCategoryInput, UpdateCategoryInput,
};
use crate::AppState;

/// Query parameters for listing categories
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create a category (admin)
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<Json<Category>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = CategoryService::new(state.db);
    let category = service.create_category(input).await?;
    Ok(Json(category))
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListCategoriesQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list_categories(query.include_inactive).await?;
    Ok(Json(categories))
}

/// Update a category (admin)
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = CategoryService::new(state.db);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Deactivate a category (admin)
pub async fn deactivate_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = CategoryService::new(state.db);
    service.deactivate_category(category_id).await?;
    Ok(Json(()))
}
