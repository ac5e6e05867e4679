//! HTTP handlers for menu products, their recipes, and production capacity

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::{ProductionCapacity, UserRole};
use crate::services::product::{CreateProductInput, Product, ProductService, UpdateProductInput};
use crate::services::recipe::{ProductRecipe, RecipeLineInput, RecipeService};
use crate::services::stock::StockService;
use crate::AppState;

/// Query parameters for listing products
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category_id: Option<Uuid>,
}

/// Request body for saving a product's recipe
#[derive(Debug, Deserialize)]
pub struct SaveRecipeRequest {
    pub lines: Vec<RecipeLineInput>,
}

/// Create a product (admin)
pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListProductsQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list_products(query.category_id).await?;
    Ok(Json(products))
}

/// Get a product
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Update a product (admin)
pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = ProductService::new(state.db);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Mark a product unavailable (admin)
pub async fn deactivate_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = ProductService::new(state.db);
    service.deactivate_product(product_id).await?;
    Ok(Json(()))
}

/// Get a product's stored recipe rows
pub async fn get_recipe(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductRecipe>>> {
    let service = RecipeService::new(state.db);
    let rows = service.list_rows(product_id).await?;
    Ok(Json(rows))
}

/// Replace a product's recipe (admin)
pub async fn save_recipe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<SaveRecipeRequest>,
) -> AppResult<Json<Vec<ProductRecipe>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = RecipeService::new(state.db);
    let rows = service.set_recipe(product_id, input.lines).await?;
    Ok(Json(rows))
}

/// Producible portions of a product given current stock
pub async fn get_production_capacity(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductionCapacity>> {
    let service = StockService::new(state.db);
    let capacity = service.production_capacity_for(product_id).await?;
    Ok(Json(capacity))
}
