//! Error handling for the Cafe POS backend
//!
//! Provides consistent error responses in English and Turkish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::models::StockRequirement;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        message_tr: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_tr: String,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_tr: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Carries the aggregated shortfall so the order flow can show
    /// exactly which ingredients block completion
    #[error("Insufficient stock for {} item(s)", .items.len())]
    InsufficientStock { items: Vec<StockRequirement> },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_tr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insufficient_items: Option<Vec<StockRequirement>>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: String, message_tr: String) -> Self {
        Self {
            code: code.to_string(),
            message_en,
            message_tr,
            field: None,
            insufficient_items: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_CREDENTIALS",
                    "Invalid email or password".to_string(),
                    "E-posta veya şifre hatalı".to_string(),
                ),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_TOKEN",
                    "Invalid token".to_string(),
                    "Geçersiz oturum anahtarı".to_string(),
                ),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action".to_string(),
                    "Bu işlem için yetkiniz yok".to_string(),
                ),
            ),
            AppError::Unauthorized { message, message_tr } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone(), message_tr.clone()),
            ),
            AppError::Validation { field, message, message_tr } => {
                let mut detail =
                    ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_tr.clone());
                detail.field = Some(field.clone());
                (StatusCode::BAD_REQUEST, detail)
            }
            AppError::InvalidQuantity(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "INVALID_QUANTITY",
                    msg.clone(),
                    format!("Geçersiz miktar: {}", msg),
                ),
            ),
            AppError::DuplicateEntry(field) => {
                let mut detail = ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                    format!("Bu {} için zaten bir kayıt var", field),
                );
                detail.field = Some(field.clone());
                (StatusCode::CONFLICT, detail)
            }
            AppError::Conflict { resource, message, message_tr } => {
                let mut detail =
                    ErrorDetail::new("CONFLICT", message.clone(), message_tr.clone());
                detail.field = Some(resource.clone());
                (StatusCode::CONFLICT, detail)
            }
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("{} bulunamadı", resource),
                ),
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INVALID_STATE_TRANSITION",
                    msg.clone(),
                    format!("Durum değiştirilemiyor: {}", msg),
                ),
            ),
            AppError::InsufficientStock { items } => {
                let names: Vec<&str> =
                    items.iter().map(|i| i.stock_item_name.as_str()).collect();
                let mut detail = ErrorDetail::new(
                    "INSUFFICIENT_STOCK",
                    format!("Insufficient stock: {}", names.join(", ")),
                    format!("Yetersiz stok: {}", names.join(", ")),
                );
                detail.insufficient_items = Some(items.clone());
                (StatusCode::UNPROCESSABLE_ENTITY, detail)
            }
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "CONFIGURATION_ERROR",
                    format!("Configuration error: {}", msg),
                    format!("Yapılandırma hatası: {}", msg),
                ),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    "Veritabanı hatası oluştu".to_string(),
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    msg.clone(),
                    "Sunucu hatası oluştu".to_string(),
                ),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    "Sunucu hatası oluştu".to_string(),
                ),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
