//! Order service: order lifecycle, totals, and table occupancy
//!
//! Completing an order deducts stock through the stock service; cancelling
//! one restores it. Those are the only two triggers for the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{order_total, OrderLine, OrderStatus};
use crate::services::stock::StockService;

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Order lifecycle states as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DbOrderStatus {
    Active,
    Ready,
    Completed,
    Cancelled,
}

impl From<DbOrderStatus> for OrderStatus {
    fn from(status: DbOrderStatus) -> Self {
        match status {
            DbOrderStatus::Active => OrderStatus::Active,
            DbOrderStatus::Ready => OrderStatus::Ready,
            DbOrderStatus::Completed => OrderStatus::Completed,
            DbOrderStatus::Cancelled => OrderStatus::Cancelled,
        }
    }
}

impl From<OrderStatus> for DbOrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Active => DbOrderStatus::Active,
            OrderStatus::Ready => DbOrderStatus::Ready,
            OrderStatus::Completed => DbOrderStatus::Completed,
            OrderStatus::Cancelled => DbOrderStatus::Cancelled,
        }
    }
}

/// Kitchen-side item states as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_item_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DbOrderItemStatus {
    Pending,
    Preparing,
    Ready,
    Served,
}

/// Payment methods as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DbPaymentMethod {
    Cash,
    Card,
    Pending,
}

/// An order row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub table_id: Uuid,
    pub user_id: Uuid,
    pub status: DbOrderStatus,
    pub total_amount: Decimal,
    pub payment_method: DbPaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order item row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub status: DbOrderItemStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order together with its line items
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Input for one line of a new order
#[derive(Debug, Deserialize)]
pub struct CreateOrderItemInput {
    pub product_id: Uuid,
    pub quantity: u32,
    pub notes: Option<String>,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub table_id: Uuid,
    pub items: Vec<CreateOrderItemInput>,
    pub notes: Option<String>,
}

/// Input for completing an order with payment
#[derive(Debug, Deserialize)]
pub struct CompleteOrderInput {
    pub payment_method: DbPaymentMethod,
}

/// Product fields needed to price an order line
#[derive(Debug, FromRow)]
struct PricedProduct {
    price: Decimal,
    is_available: bool,
    name: String,
}

const ORDER_COLUMNS: &str =
    "id, table_id, user_id, status, total_amount, payment_method, notes, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price, total_price, \
     status, notes, created_at, updated_at";

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order with its line items.
    ///
    /// Unit prices are captured from the product at order time and the
    /// total is computed server-side. The table is marked occupied.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> AppResult<OrderWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Order must have at least one item".to_string(),
                message_tr: "Sipariş en az bir ürün içermelidir".to_string(),
            });
        }

        for item in &input.items {
            if item.quantity == 0 {
                return Err(AppError::InvalidQuantity(
                    "Order quantity must be at least 1".to_string(),
                ));
            }
        }

        // Validate table exists
        let table_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tables WHERE id = $1)")
                .bind(input.table_id)
                .fetch_one(&self.db)
                .await?;

        if !table_exists {
            return Err(AppError::NotFound("Table".to_string()));
        }

        // One open order per table
        let open_order = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM orders
                WHERE table_id = $1 AND status IN ('active', 'ready')
            )
            "#,
        )
        .bind(input.table_id)
        .fetch_one(&self.db)
        .await?;

        if open_order {
            return Err(AppError::Conflict {
                resource: "table".to_string(),
                message: "Table already has an open order".to_string(),
                message_tr: "Masada zaten açık bir sipariş var".to_string(),
            });
        }

        // Price every line from the current menu
        let mut priced = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let product = sqlx::query_as::<_, PricedProduct>(
                "SELECT price, is_available, name FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            if !product.is_available {
                return Err(AppError::Conflict {
                    resource: "product".to_string(),
                    message: format!("{} is not available", product.name),
                    message_tr: format!("{} şu anda satışta değil", product.name),
                });
            }

            priced.push((product.price, item.quantity));
        }

        let total = order_total(&priced);

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (table_id, user_id, notes, total_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(input.table_id)
        .bind(user_id)
        .bind(&input.notes)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for (item, (unit_price, _)) in input.items.iter().zip(&priced) {
            let row = sqlx::query_as::<_, OrderItem>(&format!(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price, total_price,
                                         notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {ORDER_ITEM_COLUMNS}
                "#,
            ))
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.quantity as i32)
            .bind(unit_price)
            .bind(*unit_price * Decimal::from(item.quantity))
            .bind(&item.notes)
            .fetch_one(&mut *tx)
            .await?;

            items.push(row);
        }

        sqlx::query("UPDATE tables SET status = 'occupied', updated_at = NOW() WHERE id = $1")
            .bind(input.table_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderWithItems { order, items })
    }

    /// Get an order with its items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1",
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = self.get_items(order_id).await?;

        Ok(OrderWithItems { order, items })
    }

    /// List orders, optionally filtered by status, newest first
    pub async fn list_orders(&self, status: Option<DbOrderStatus>) -> AppResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE $1::order_status IS NULL OR status = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Mark an order ready (kitchen finished preparing it)
    pub async fn mark_ready(&self, order_id: Uuid) -> AppResult<Order> {
        let order = self.get_order(order_id).await?.order;
        self.ensure_transition(order.status, OrderStatus::Ready)?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders SET status = 'ready', updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        Ok(order)
    }

    /// Complete an order: deduct stock, capture payment, free the table.
    ///
    /// Stock deduction runs first; an insufficient-stock failure blocks
    /// completion and surfaces the shortfall, and no payment is recorded.
    pub async fn complete_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        input: CompleteOrderInput,
    ) -> AppResult<OrderWithItems> {
        let current = self.get_order(order_id).await?;
        self.ensure_transition(current.order.status, OrderStatus::Completed)?;

        if input.payment_method == DbPaymentMethod::Pending {
            return Err(AppError::Validation {
                field: "payment_method".to_string(),
                message: "Completed orders require a payment method".to_string(),
                message_tr: "Tamamlanan sipariş için ödeme yöntemi gerekli".to_string(),
            });
        }

        let lines: Vec<OrderLine> = current
            .items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity as u32,
            })
            .collect();

        let stock_service = StockService::new(self.db.clone());
        stock_service
            .deduct_for_order(&lines, order_id, user_id)
            .await?;

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders SET status = 'completed', payment_method = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(input.payment_method)
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tables SET status = 'empty', updated_at = NOW() WHERE id = $1")
            .bind(order.table_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let items = self.get_items(order_id).await?;

        Ok(OrderWithItems { order, items })
    }

    /// Cancel an order: restore any deducted stock and free the table.
    ///
    /// Restoration replays the order's ledger entries and is idempotent, so
    /// cancelling an order that never reached completion restores nothing.
    pub async fn cancel_order(&self, order_id: Uuid, user_id: Uuid) -> AppResult<OrderWithItems> {
        let current = self.get_order(order_id).await?;
        self.ensure_transition(current.order.status, OrderStatus::Cancelled)?;

        let stock_service = StockService::new(self.db.clone());
        stock_service.restore_for_order(order_id, user_id).await?;

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#,
        ))
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE tables SET status = 'empty', updated_at = NOW() WHERE id = $1")
            .bind(order.table_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let items = self.get_items(order_id).await?;

        Ok(OrderWithItems { order, items })
    }

    /// Update the kitchen-side status of one order item
    pub async fn update_item_status(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        status: DbOrderItemStatus,
    ) -> AppResult<OrderItem> {
        let order = self.get_order(order_id).await?.order;
        if OrderStatus::from(order.status).is_terminal() {
            return Err(AppError::InvalidStateTransition(
                "Order is already closed".to_string(),
            ));
        }

        let item = sqlx::query_as::<_, OrderItem>(&format!(
            r#"
            UPDATE order_items SET status = $1, updated_at = NOW()
            WHERE id = $2 AND order_id = $3
            RETURNING {ORDER_ITEM_COLUMNS}
            "#,
        ))
        .bind(status)
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order item".to_string()))?;

        Ok(item)
    }

    /// Items of an order
    async fn get_items(&self, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            r#"
            SELECT {ORDER_ITEM_COLUMNS}
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at
            "#,
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    fn ensure_transition(&self, from: DbOrderStatus, to: OrderStatus) -> AppResult<()> {
        let from = OrderStatus::from(from);
        if !from.can_transition_to(to) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move order from {} to {}",
                from.as_str(),
                to.as_str()
            )));
        }
        Ok(())
    }
}
