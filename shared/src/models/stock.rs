//! Stock models and requirement aggregation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RecipeIngredient;

/// A category grouping stock items (e.g. dairy, dry goods)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An inventory-tracked ingredient or supply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub unit: String,
    pub min_stock_level: Decimal,
    pub max_stock_level: Decimal,
    pub current_stock: Decimal,
    pub unit_cost: Decimal,
    pub supplier: Option<String>,
    pub barcode: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        }
    }
}

/// What caused a ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementReference {
    Order,
    OrderCancel,
    Purchase,
    Manual,
    Usage,
    Waste,
    Expired,
    Return,
    Transfer,
}

impl MovementReference {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementReference::Order => "order",
            MovementReference::OrderCancel => "order_cancel",
            MovementReference::Purchase => "purchase",
            MovementReference::Manual => "manual",
            MovementReference::Usage => "usage",
            MovementReference::Waste => "waste",
            MovementReference::Expired => "expired",
            MovementReference::Return => "return",
            MovementReference::Transfer => "transfer",
        }
    }
}

/// One immutable ledger entry recording a stock change and its cause
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub movement_type: MovementType,
    /// Always a non-negative magnitude; direction comes from `movement_type`
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub unit_cost: Decimal,
    pub reference_type: Option<MovementReference>,
    pub reference_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Kinds of informational stock alerts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    ExpiringSoon,
    Expired,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "low_stock",
            AlertType::OutOfStock => "out_of_stock",
            AlertType::ExpiringSoon => "expiring_soon",
            AlertType::Expired => "expired",
        }
    }
}

/// A derived alert on a stock item. Informational only: alerts never gate
/// order placement or any other write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub alert_type: AlertType,
    pub threshold_value: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub message: Option<String>,
    pub is_acknowledged: bool,
    pub acknowledged_by: Option<Uuid>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Coarse stock level for badges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Ok,
    Low,
    Out,
}

/// Classify a stock level against its minimum threshold
pub fn classify_stock_level(current_stock: Decimal, min_stock_level: Decimal) -> StockLevel {
    if current_stock <= Decimal::ZERO {
        StockLevel::Out
    } else if current_stock <= min_stock_level {
        StockLevel::Low
    } else {
        StockLevel::Ok
    }
}

/// An aggregated draw on one stock item across a whole order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequirement {
    pub stock_item_id: Uuid,
    pub stock_item_name: String,
    pub unit: String,
    /// Total quantity the order draws from this item, summed across lines
    pub quantity_needed: Decimal,
    pub current_stock: Decimal,
    pub is_critical: bool,
}

impl StockRequirement {
    pub fn is_satisfied(&self) -> bool {
        self.quantity_needed <= self.current_stock
    }
}

/// Result of an availability check for a set of order lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheck {
    pub can_fulfill: bool,
    pub requirements: Vec<StockRequirement>,
    pub insufficient_items: Vec<StockRequirement>,
}

/// Aggregate per-item requirements across order lines.
///
/// Each entry pairs a line quantity with the resolved recipe of that line's
/// product. Requirements that share a stock item are summed into a single
/// record, so the total draw on a shared ingredient reflects the whole
/// order. A line with an empty recipe contributes nothing.
pub fn aggregate_requirements(lines: &[(u32, Vec<RecipeIngredient>)]) -> Vec<StockRequirement> {
    let mut requirements: Vec<StockRequirement> = Vec::new();

    for (quantity, recipe) in lines {
        for ingredient in recipe {
            let total_needed = ingredient.quantity_needed * Decimal::from(*quantity);

            match requirements
                .iter_mut()
                .find(|req| req.stock_item_id == ingredient.stock_item_id)
            {
                Some(existing) => {
                    existing.quantity_needed += total_needed;
                    existing.is_critical |= ingredient.is_critical;
                }
                None => requirements.push(StockRequirement {
                    stock_item_id: ingredient.stock_item_id,
                    stock_item_name: ingredient.stock_item_name.clone(),
                    unit: ingredient.unit.clone(),
                    quantity_needed: total_needed,
                    current_stock: ingredient.current_stock,
                    is_critical: ingredient.is_critical,
                }),
            }
        }
    }

    requirements
}

/// Partition aggregated requirements into a check result
pub fn check_requirements(requirements: Vec<StockRequirement>) -> StockCheck {
    let insufficient_items: Vec<StockRequirement> = requirements
        .iter()
        .filter(|req| !req.is_satisfied())
        .cloned()
        .collect();

    StockCheck {
        can_fulfill: insufficient_items.is_empty(),
        requirements,
        insufficient_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn milk(needed: &str, stock: &str) -> RecipeIngredient {
        RecipeIngredient {
            stock_item_id: Uuid::from_u128(1),
            stock_item_name: "Milk".to_string(),
            unit: "liter".to_string(),
            quantity_needed: dec(needed),
            current_stock: dec(stock),
            is_critical: false,
        }
    }

    #[test]
    fn test_shared_ingredient_is_summed() {
        // Product A needs 2 milk, product B needs 3; one of each ordered
        let lines = vec![(1, vec![milk("2", "10")]), (1, vec![milk("3", "10")])];
        let requirements = aggregate_requirements(&lines);

        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].quantity_needed, dec("5"));
    }

    #[test]
    fn test_line_quantity_scales_recipe() {
        let lines = vec![(4, vec![milk("0.2", "10")])];
        let requirements = aggregate_requirements(&lines);
        assert_eq!(requirements[0].quantity_needed, dec("0.8"));
    }

    #[test]
    fn test_empty_recipe_contributes_nothing() {
        let lines = vec![(5, vec![]), (1, vec![milk("1", "2")])];
        let requirements = aggregate_requirements(&lines);
        assert_eq!(requirements.len(), 1);
    }

    #[test]
    fn test_check_partitions_shortfall() {
        let lines = vec![(3, vec![milk("1", "2")])];
        let check = check_requirements(aggregate_requirements(&lines));

        assert!(!check.can_fulfill);
        assert_eq!(check.insufficient_items.len(), 1);
        assert_eq!(check.insufficient_items[0].quantity_needed, dec("3"));
    }

    #[test]
    fn test_exact_stock_is_sufficient() {
        let lines = vec![(2, vec![milk("1", "2")])];
        let check = check_requirements(aggregate_requirements(&lines));
        assert!(check.can_fulfill);
        assert!(check.insufficient_items.is_empty());
    }

    #[test]
    fn test_classify_stock_level() {
        assert_eq!(classify_stock_level(dec("0"), dec("5")), StockLevel::Out);
        assert_eq!(classify_stock_level(dec("3"), dec("5")), StockLevel::Low);
        assert_eq!(classify_stock_level(dec("5"), dec("5")), StockLevel::Low);
        assert_eq!(classify_stock_level(dec("8"), dec("5")), StockLevel::Ok);
    }
}
