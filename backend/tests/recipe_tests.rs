//! Recipe and production capacity tests
//!
//! Tests for recipe resolution semantics:
//! - Empty recipe means unconstrained production, never zero
//! - The tightest-constraining ingredient bounds capacity
//! - Malformed recipe rows are rejected

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{production_capacity, ProductionCapacity, RecipeIngredient};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn ingredient(needed: &str, stock: &str) -> RecipeIngredient {
    RecipeIngredient {
        stock_item_id: Uuid::new_v4(),
        stock_item_name: "ingredient".to_string(),
        unit: "unit".to_string(),
        quantity_needed: dec(needed),
        current_stock: dec(stock),
        is_critical: false,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A product without a recipe can always be produced
    #[test]
    fn test_no_recipe_is_unlimited() {
        let capacity = production_capacity(&[]).unwrap();
        assert_eq!(capacity, ProductionCapacity::Unlimited);
        assert!(capacity.is_unlimited());
        assert_eq!(capacity.portions(), None);
    }

    /// The minimum over ingredients is the binding constraint:
    /// 2 flour per portion (stock 10) and 1 sugar (stock 3) -> min(5, 3) = 3
    #[test]
    fn test_capacity_is_binding_constraint() {
        let recipe = vec![ingredient("2", "10"), ingredient("1", "3")];
        assert_eq!(
            production_capacity(&recipe).unwrap(),
            ProductionCapacity::Limited { portions: 3 }
        );
    }

    /// Fractional quotients floor to whole portions
    #[test]
    fn test_capacity_floors() {
        let recipe = vec![ingredient("0.25", "0.9")];
        assert_eq!(
            production_capacity(&recipe).unwrap(),
            ProductionCapacity::Limited { portions: 3 }
        );
    }

    /// A depleted ingredient makes the whole product unproducible
    #[test]
    fn test_depleted_ingredient_zeroes_capacity() {
        let recipe = vec![ingredient("1", "0"), ingredient("1", "100")];
        assert_eq!(
            production_capacity(&recipe).unwrap(),
            ProductionCapacity::Limited { portions: 0 }
        );
    }

    /// A zero quantity_needed row is malformed data, not "non-constraining"
    #[test]
    fn test_zero_quantity_needed_is_invalid() {
        let recipe = vec![ingredient("0", "100")];
        assert!(production_capacity(&recipe).is_err());
    }

    /// A negative quantity_needed row is rejected the same way
    #[test]
    fn test_negative_quantity_needed_is_invalid() {
        let recipe = vec![ingredient("-1", "100")];
        assert!(production_capacity(&recipe).is_err());
    }

    /// Unlimited capacity is distinct from any finite portion count
    #[test]
    fn test_unlimited_is_not_zero() {
        let unlimited = production_capacity(&[]).unwrap();
        let empty_stock = production_capacity(&[ingredient("1", "0")]).unwrap();

        assert_ne!(unlimited, empty_stock);
        assert_eq!(empty_stock, ProductionCapacity::Limited { portions: 0 });
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1)) // 0.1 to 1000.0
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Capacity never exceeds any single ingredient's own quotient
        #[test]
        fn prop_capacity_bounded_by_each_ingredient(
            rows in prop::collection::vec((quantity_strategy(), quantity_strategy()), 1..8)
        ) {
            let recipe: Vec<RecipeIngredient> = rows
                .iter()
                .map(|(needed, stock)| RecipeIngredient {
                    stock_item_id: Uuid::new_v4(),
                    stock_item_name: "x".to_string(),
                    unit: "unit".to_string(),
                    quantity_needed: *needed,
                    current_stock: *stock,
                    is_critical: false,
                })
                .collect();

            let capacity = production_capacity(&recipe).unwrap();
            let portions = capacity.portions().unwrap();

            for row in &recipe {
                use rust_decimal::prelude::ToPrimitive;
                let own = (row.current_stock / row.quantity_needed)
                    .floor()
                    .to_u64()
                    .unwrap_or(0);
                prop_assert!(portions <= own);
            }
        }

        /// Adding stock never lowers capacity
        #[test]
        fn prop_capacity_monotonic_in_stock(
            needed in quantity_strategy(),
            stock in quantity_strategy(),
            extra in quantity_strategy()
        ) {
            let before = production_capacity(&[RecipeIngredient {
                stock_item_id: Uuid::from_u128(1),
                stock_item_name: "x".to_string(),
                unit: "unit".to_string(),
                quantity_needed: needed,
                current_stock: stock,
                is_critical: false,
            }])
            .unwrap();

            let after = production_capacity(&[RecipeIngredient {
                stock_item_id: Uuid::from_u128(1),
                stock_item_name: "x".to_string(),
                unit: "unit".to_string(),
                quantity_needed: needed,
                current_stock: stock + extra,
                is_critical: false,
            }])
            .unwrap();

            prop_assert!(after.portions().unwrap() >= before.portions().unwrap());
        }

        /// The deducted portions are always producible: deducting
        /// capacity * quantity_needed never overdraws the ingredient
        #[test]
        fn prop_capacity_portions_are_producible(
            needed in quantity_strategy(),
            stock in quantity_strategy()
        ) {
            let capacity = production_capacity(&[RecipeIngredient {
                stock_item_id: Uuid::from_u128(1),
                stock_item_name: "x".to_string(),
                unit: "unit".to_string(),
                quantity_needed: needed,
                current_stock: stock,
                is_critical: false,
            }])
            .unwrap();

            let portions = Decimal::from(capacity.portions().unwrap());
            prop_assert!(portions * needed <= stock);
        }
    }
}
