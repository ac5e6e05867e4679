//! Product recipe (bill of materials) models and capacity arithmetic

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recipe row: a stock item consumed by producing one unit of a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub product_id: Uuid,
    pub stock_item_id: Uuid,
    pub quantity_needed: Decimal,
    pub unit: String,
    pub is_critical: bool,
    pub cost_percentage: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A resolved ingredient requirement for one unit of a product,
/// carrying the live stock of that ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub stock_item_id: Uuid,
    pub stock_item_name: String,
    pub unit: String,
    pub quantity_needed: Decimal,
    pub current_stock: Decimal,
    pub is_critical: bool,
}

/// How many whole units of a product current stock can support
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductionCapacity {
    /// No recipe rows: production is not stock-constrained
    Unlimited,
    Limited { portions: u64 },
}

impl ProductionCapacity {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, ProductionCapacity::Unlimited)
    }

    pub fn portions(&self) -> Option<u64> {
        match self {
            ProductionCapacity::Unlimited => None,
            ProductionCapacity::Limited { portions } => Some(*portions),
        }
    }
}

/// Compute producible portions from a resolved recipe.
///
/// The tightest-constraining ingredient determines the result:
/// `min(floor(current_stock / quantity_needed))` over all rows. An empty
/// recipe is unconstrained. A row with `quantity_needed <= 0` is malformed
/// data and is rejected rather than treated as non-constraining.
pub fn production_capacity(recipe: &[RecipeIngredient]) -> Result<ProductionCapacity, &'static str> {
    if recipe.is_empty() {
        return Ok(ProductionCapacity::Unlimited);
    }

    let mut portions = u64::MAX;
    for ingredient in recipe {
        if ingredient.quantity_needed <= Decimal::ZERO {
            return Err("Recipe quantity must be positive");
        }
        let stock = ingredient.current_stock.max(Decimal::ZERO);
        let capacity = (stock / ingredient.quantity_needed)
            .floor()
            .to_u64()
            .unwrap_or(0);
        portions = portions.min(capacity);
    }

    Ok(ProductionCapacity::Limited { portions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ingredient(needed: &str, stock: &str) -> RecipeIngredient {
        RecipeIngredient {
            stock_item_id: Uuid::new_v4(),
            stock_item_name: "test".to_string(),
            unit: "kg".to_string(),
            quantity_needed: dec(needed),
            current_stock: dec(stock),
            is_critical: false,
        }
    }

    #[test]
    fn test_empty_recipe_is_unlimited() {
        assert_eq!(production_capacity(&[]), Ok(ProductionCapacity::Unlimited));
    }

    #[test]
    fn test_tightest_ingredient_wins() {
        // 2 flour per portion with 10 in stock -> 5; 1 sugar with 3 -> 3
        let recipe = vec![ingredient("2", "10"), ingredient("1", "3")];
        assert_eq!(
            production_capacity(&recipe),
            Ok(ProductionCapacity::Limited { portions: 3 })
        );
    }

    #[test]
    fn test_fractional_stock_floors() {
        let recipe = vec![ingredient("0.3", "1.0")];
        assert_eq!(
            production_capacity(&recipe),
            Ok(ProductionCapacity::Limited { portions: 3 })
        );
    }

    #[test]
    fn test_zero_quantity_needed_rejected() {
        let recipe = vec![ingredient("0", "10")];
        assert!(production_capacity(&recipe).is_err());
    }

    #[test]
    fn test_depleted_ingredient_means_zero() {
        let recipe = vec![ingredient("1", "0"), ingredient("1", "50")];
        assert_eq!(
            production_capacity(&recipe),
            Ok(ProductionCapacity::Limited { portions: 0 })
        );
    }
}
