//! Route definitions for the Cafe POS backend

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public login/refresh, protected staff management)
        .nest("/auth", auth_routes())
        // Protected routes - table management
        .nest("/tables", table_routes())
        // Protected routes - menu management
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        // Protected routes - orders
        .nest("/orders", order_routes())
        // Protected routes - stock administration
        .nest("/stock", stock_routes())
        // Protected routes - alerts
        .nest("/alerts", alert_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .nest("/staff", staff_routes())
}

/// Staff management routes (protected)
fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_staff).post(handlers::create_staff))
        .route("/:user_id", delete(handlers::deactivate_staff))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Table management routes (protected)
fn table_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tables).post(handlers::create_table))
        .route(
            "/:table_id",
            get(handlers::get_table)
                .put(handlers::update_table)
                .delete(handlers::delete_table),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Menu category routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            put(handlers::update_category).delete(handlers::deactivate_category),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Menu product routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::deactivate_product),
        )
        .route(
            "/:product_id/recipe",
            get(handlers::get_recipe).put(handlers::save_recipe),
        )
        .route(
            "/:product_id/capacity",
            get(handlers::get_production_capacity),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/check-availability", post(handlers::check_availability))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/ready", post(handlers::mark_order_ready))
        .route("/:order_id/complete", post(handlers::complete_order))
        .route("/:order_id/cancel", post(handlers::cancel_order))
        .route(
            "/:order_id/items/:item_id/status",
            put(handlers::update_item_status),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock administration routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        // Items
        .route(
            "/items",
            get(handlers::list_stock_items).post(handlers::create_stock_item),
        )
        .route(
            "/items/:item_id",
            get(handlers::get_stock_item)
                .put(handlers::update_stock_item)
                .delete(handlers::deactivate_stock_item),
        )
        .route("/items/:item_id/movements", get(handlers::get_item_movements))
        .route(
            "/items/:item_id/reconciliation",
            get(handlers::reconcile_stock_item),
        )
        // Movements
        .route("/movements", post(handlers::record_movement))
        // Critical items feed
        .route("/critical", get(handlers::get_critical_items))
        // Stock categories
        .route(
            "/categories",
            get(handlers::list_stock_categories).post(handlers::create_stock_category),
        )
        .route(
            "/categories/:category_id",
            put(handlers::update_stock_category).delete(handlers::delete_stock_category),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Alert routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/refresh", post(handlers::refresh_alerts))
        .route("/:alert_id/acknowledge", post(handlers::acknowledge_alert))
        .route("/:alert_id/resolve", post(handlers::resolve_alert))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/stock-valuation", get(handlers::get_stock_valuation))
        .route("/movements.csv", get(handlers::export_movements_csv))
        .route_layer(middleware::from_fn(auth_middleware))
}
