//! Order models and order arithmetic

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An order placed at a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub table_id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single line of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub status: OrderItemStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order lifecycle states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Allowed lifecycle transitions: active -> ready -> completed,
    /// with cancellation possible from active or ready.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Active, OrderStatus::Ready)
                | (OrderStatus::Active, OrderStatus::Completed)
                | (OrderStatus::Ready, OrderStatus::Completed)
                | (OrderStatus::Active, OrderStatus::Cancelled)
                | (OrderStatus::Ready, OrderStatus::Cancelled)
        )
    }

    /// Terminal states never leave the kitchen/cashier flow again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Kitchen-side state of a single order item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderItemStatus {
    Pending,
    Preparing,
    Ready,
    Served,
}

impl OrderItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "pending",
            OrderItemStatus::Preparing => "preparing",
            OrderItemStatus::Ready => "ready",
            OrderItemStatus::Served => "served",
        }
    }
}

/// How an order was (or will be) paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Pending,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Pending => "pending",
        }
    }
}

/// A product/quantity pair, the stock engine's view of an order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Sum of line totals for an order
pub fn order_total(lines: &[(Decimal, u32)]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, (unit_price, quantity)| {
            acc + unit_price * Decimal::from(*quantity)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_order_total() {
        let lines = vec![(dec("12.50"), 2), (dec("8.00"), 1)];
        assert_eq!(order_total(&lines), dec("33.00"));
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_status_transitions() {
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));

        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Active));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Active));
    }
}
