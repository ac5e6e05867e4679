//! HTTP handlers for authentication and staff management

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::models::UserRole;
use crate::services::auth::{AuthService, AuthTokens, CreateStaffInput, StaffAccount};
use crate::AppState;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Authenticate with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(&input.email, &input.password).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for new tokens
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.refresh_token(&input.refresh_token).await?;
    Ok(Json(tokens))
}

/// Create a staff account (admin)
pub async fn create_staff(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStaffInput>,
) -> AppResult<Json<StaffAccount>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = AuthService::new(state.db, &state.config);
    let account = service.create_staff(input).await?;
    Ok(Json(account))
}

/// List staff accounts (admin)
pub async fn list_staff(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StaffAccount>>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = AuthService::new(state.db, &state.config);
    let accounts = service.list_staff().await?;
    Ok(Json(accounts))
}

/// Deactivate a staff account (admin)
pub async fn deactivate_staff(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    require_role(&current_user.0, UserRole::Admin)?;
    let service = AuthService::new(state.db, &state.config);
    service.deactivate_staff(user_id).await?;
    Ok(Json(()))
}
