//! Stock accounting tests
//!
//! Tests for the stock engine including:
//! - Requirement aggregation across order lines
//! - All-or-nothing order deduction
//! - Ledger-based restoration and idempotent cancellation

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{
    aggregate_requirements, check_requirements, RecipeIngredient, StockRequirement,
};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn ingredient(id: u128, name: &str, needed: &str, stock: &str) -> RecipeIngredient {
    RecipeIngredient {
        stock_item_id: Uuid::from_u128(id),
        stock_item_name: name.to_string(),
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

    /// Two lines sharing one ingredient produce a single summed requirement
    #[test]
    fn test_shared_ingredient_aggregation() {
        // Product A needs 2 milk, product B needs 3; order = 1xA + 1xB
        let lines = vec![
            (1, vec![ingredient(1, "Milk", "2", "10")]),
            (1, vec![ingredient(1, "Milk", "3", "10")]),
        ];

        let requirements = aggregate_requirements(&lines);

        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].quantity_needed, dec("5"));
    }

    /// Distinct ingredients stay distinct
    #[test]
    fn test_distinct_ingredients_not_merged() {
        let lines = vec![
            (1, vec![ingredient(1, "Milk", "2", "10")]),
            (1, vec![ingredient(2, "Sugar", "3", "10")]),
        ];

        let requirements = aggregate_requirements(&lines);
        assert_eq!(requirements.len(), 2);
    }

    /// A product with no recipe never appears in the shortfall
    #[test]
    fn test_unconstrained_product_never_insufficient() {
        let lines = vec![(50, vec![]), (1, vec![ingredient(1, "Milk", "1", "0.5")])];

        let check = check_requirements(aggregate_requirements(&lines));

        assert!(!check.can_fulfill);
        assert_eq!(check.insufficient_items.len(), 1);
        assert_eq!(check.insufficient_items[0].stock_item_id, Uuid::from_u128(1));
    }

    /// Check is pure: requirements carry the stock snapshot unchanged
    #[test]
    fn test_check_does_not_mutate_stock() {
        let lines = vec![(2, vec![ingredient(1, "Milk", "1", "10")])];
        let check = check_requirements(aggregate_requirements(&lines));

        assert_eq!(check.requirements[0].current_stock, dec("10"));
    }

    /// Exactly enough stock fulfills the order
    #[test]
    fn test_exact_stock_fulfills() {
        let lines = vec![(5, vec![ingredient(1, "Milk", "2", "10")])];
        let check = check_requirements(aggregate_requirements(&lines));

        assert!(check.can_fulfill);
        assert!(check.insufficient_items.is_empty());
    }

    /// One unit over the available stock blocks the order
    #[test]
    fn test_one_over_blocks() {
        let lines = vec![(6, vec![ingredient(1, "Milk", "2", "11.9")])];
        let check = check_requirements(aggregate_requirements(&lines));

        assert!(!check.can_fulfill);
    }

    /// A critical flag on any merged row survives aggregation
    #[test]
    fn test_critical_flag_survives_merge() {
        let mut critical = ingredient(1, "Milk", "1", "10");
        critical.is_critical = true;

        let lines = vec![
            (1, vec![ingredient(1, "Milk", "1", "10")]),
            (1, vec![critical]),
        ];

        let requirements = aggregate_requirements(&lines);
        assert!(requirements[0].is_critical);
    }
}

// ============================================================================
// Ledger Simulation (mirrors the service's transactional discipline)
// ============================================================================

#[cfg(test)]
mod ledger_simulation {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Movement {
        pub item: Uuid,
        pub movement_type: &'static str,
        pub quantity: Decimal,
        pub previous_stock: Decimal,
        pub new_stock: Decimal,
        pub reference_type: &'static str,
        pub reference_id: u32,
    }

    #[derive(Debug, Default)]
    pub struct Ledger {
        pub stock: BTreeMap<Uuid, Decimal>,
        pub movements: Vec<Movement>,
    }

    impl Ledger {
        pub fn with_stock(levels: &[(Uuid, Decimal)]) -> Self {
            Self {
                stock: levels.iter().cloned().collect(),
                movements: Vec::new(),
            }
        }

        /// All-or-nothing deduction: if any requirement cannot be covered,
        /// no stock changes and no movement is written.
        pub fn deduct_for_order(
            &mut self,
            requirements: &[StockRequirement],
            order_id: u32,
        ) -> Result<(), Vec<Uuid>> {
            let short: Vec<Uuid> = requirements
                .iter()
                .filter(|req| {
                    self.stock.get(&req.stock_item_id).copied().unwrap_or(Decimal::ZERO)
                        < req.quantity_needed
                })
                .map(|req| req.stock_item_id)
                .collect();

            if !short.is_empty() {
                return Err(short);
            }

            for req in requirements {
                let previous = self.stock[&req.stock_item_id];
                let new = previous - req.quantity_needed;
                self.stock.insert(req.stock_item_id, new);
                self.movements.push(Movement {
                    item: req.stock_item_id,
                    movement_type: "out",
                    quantity: req.quantity_needed,
                    previous_stock: previous,
                    new_stock: new,
                    reference_type: "order",
                    reference_id: order_id,
                });
            }

            Ok(())
        }

        /// Replay an order's out movements as compensating in movements.
        /// A second call for the same order is a no-op.
        pub fn restore_for_order(&mut self, order_id: u32) {
            let already_restored = self.movements.iter().any(|m| {
                m.reference_type == "order_cancel" && m.reference_id == order_id
            });
            if already_restored {
                return;
            }

            let deductions: Vec<Movement> = self
                .movements
                .iter()
                .filter(|m| {
                    m.reference_type == "order"
                        && m.reference_id == order_id
                        && m.movement_type == "out"
                })
                .cloned()
                .collect();

            for deduction in deductions {
                let previous = self.stock[&deduction.item];
                let new = previous + deduction.quantity;
                self.stock.insert(deduction.item, new);
                self.movements.push(Movement {
                    item: deduction.item,
                    movement_type: "in",
                    quantity: deduction.quantity,
                    previous_stock: previous,
                    new_stock: new,
                    reference_type: "order_cancel",
                    reference_id: order_id,
                });
            }
        }

        pub fn manual_in(&mut self, item: Uuid, quantity: Decimal) {
            let previous = self.stock[&item];
            let new = previous + quantity;
            self.stock.insert(item, new);
            self.movements.push(Movement {
                item,
                movement_type: "in",
                quantity,
                previous_stock: previous,
                new_stock: new,
                reference_type: "purchase",
                reference_id: 0,
            });
        }
    }

    fn requirement(id: Uuid, needed: &str) -> StockRequirement {
        StockRequirement {
            stock_item_id: id,
            stock_item_name: "item".to_string(),
            unit: "unit".to_string(),
            quantity_needed: dec(needed),
            current_stock: Decimal::ZERO,
            is_critical: false,
        }
    }

    /// Overdraft is rejected and writes zero movements
    #[test]
    fn test_overdraft_rejected_without_movements() {
        let milk = Uuid::from_u128(1);
        let sugar = Uuid::from_u128(2);
        let mut ledger =
            Ledger::with_stock(&[(milk, dec("10")), (sugar, dec("1"))]);

        let result = ledger.deduct_for_order(
            &[requirement(milk, "5"), requirement(sugar, "2")],
            1,
        );

        assert!(result.is_err());
        assert!(ledger.movements.is_empty());
        assert_eq!(ledger.stock[&milk], dec("10"));
        assert_eq!(ledger.stock[&sugar], dec("1"));
    }

    /// Deplete-then-restore returns stock to the pre-deduction value
    #[test]
    fn test_restoration_round_trip() {
        let milk = Uuid::from_u128(1);
        let mut ledger = Ledger::with_stock(&[(milk, dec("10"))]);

        ledger
            .deduct_for_order(&[requirement(milk, "4")], 7)
            .unwrap();
        assert_eq!(ledger.stock[&milk], dec("6"));

        ledger.restore_for_order(7);
        assert_eq!(ledger.stock[&milk], dec("10"));
    }

    /// Restoration adds back the deducted quantity on top of whatever the
    /// stock level is now, rather than resetting to a stale absolute value
    #[test]
    fn test_restoration_respects_interleaved_movements() {
        let milk = Uuid::from_u128(1);
        let mut ledger = Ledger::with_stock(&[(milk, dec("10"))]);

        ledger
            .deduct_for_order(&[requirement(milk, "4")], 7)
            .unwrap();
        // An unrelated purchase arrives before the cancellation
        ledger.manual_in(milk, dec("20"));

        ledger.restore_for_order(7);

        // 10 - 4 + 20 + 4, not a reset to 10
        assert_eq!(ledger.stock[&milk], dec("30"));
    }

    /// Cancelling twice must not double-credit stock
    #[test]
    fn test_idempotent_cancellation() {
        let milk = Uuid::from_u128(1);
        let mut ledger = Ledger::with_stock(&[(milk, dec("10"))]);

        ledger
            .deduct_for_order(&[requirement(milk, "4")], 7)
            .unwrap();
        ledger.restore_for_order(7);
        ledger.restore_for_order(7);

        assert_eq!(ledger.stock[&milk], dec("10"));
        let compensations = ledger
            .movements
            .iter()
            .filter(|m| m.reference_type == "order_cancel")
            .count();
        assert_eq!(compensations, 1);
    }

    /// Corrections are new rows; prior entries are never rewritten
    #[test]
    fn test_ledger_entries_are_immutable() {
        let milk = Uuid::from_u128(1);
        let mut ledger = Ledger::with_stock(&[(milk, dec("10"))]);

        ledger
            .deduct_for_order(&[requirement(milk, "4")], 7)
            .unwrap();
        let original = ledger.movements[0].clone();

        ledger.restore_for_order(7);

        assert_eq!(ledger.movements[0], original);
        assert_eq!(ledger.movements.len(), 2);
    }

    /// Cancelling an order that never deducted restores nothing
    #[test]
    fn test_cancel_without_deduction_is_noop() {
        let milk = Uuid::from_u128(1);
        let mut ledger = Ledger::with_stock(&[(milk, dec("10"))]);

        ledger.restore_for_order(42);

        assert_eq!(ledger.stock[&milk], dec("10"));
        assert!(ledger.movements.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating positive decimal quantities
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1)) // 0.1 to 1000.0
    }

    /// Strategy for generating order line quantities
    fn line_quantity_strategy() -> impl Strategy<Value = u32> {
        1u32..=20
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The aggregated requirement for one ingredient equals the sum of
        /// each line's quantity times the per-unit need
        #[test]
        fn prop_aggregation_sums_scaled_needs(
            needs in prop::collection::vec(quantity_strategy(), 1..8),
            quantities in prop::collection::vec(line_quantity_strategy(), 1..8)
        ) {
            let len = needs.len().min(quantities.len());
            let lines: Vec<(u32, Vec<RecipeIngredient>)> = (0..len)
                .map(|i| {
                    (quantities[i], vec![RecipeIngredient {
                        stock_item_id: Uuid::from_u128(1),
                        stock_item_name: "shared".to_string(),
                        unit: "unit".to_string(),
                        quantity_needed: needs[i],
                        current_stock: dec("1000000"),
                        is_critical: false,
                    }])
                })
                .collect();

            let expected: Decimal = (0..len)
                .map(|i| needs[i] * Decimal::from(quantities[i]))
                .sum();

            let requirements = aggregate_requirements(&lines);

            prop_assert_eq!(requirements.len(), 1);
            prop_assert_eq!(requirements[0].quantity_needed, expected);
        }

        /// can_fulfill holds exactly when no requirement exceeds its stock
        #[test]
        fn prop_can_fulfill_iff_no_shortfall(
            needed in quantity_strategy(),
            stock in quantity_strategy(),
            quantity in line_quantity_strategy()
        ) {
            let lines = vec![(quantity, vec![RecipeIngredient {
                stock_item_id: Uuid::from_u128(1),
                stock_item_name: "item".to_string(),
                unit: "unit".to_string(),
                quantity_needed: needed,
                current_stock: stock,
                is_critical: false,
            }])];

            let check = check_requirements(aggregate_requirements(&lines));
            let total_needed = needed * Decimal::from(quantity);

            prop_assert_eq!(check.can_fulfill, total_needed <= stock);
            prop_assert_eq!(check.insufficient_items.is_empty(), check.can_fulfill);
        }

        /// Aggregation never invents or loses quantity across distinct items
        #[test]
        fn prop_total_draw_is_preserved(
            needs in prop::collection::vec(quantity_strategy(), 1..10),
            quantity in line_quantity_strategy()
        ) {
            let lines: Vec<(u32, Vec<RecipeIngredient>)> = needs
                .iter()
                .enumerate()
                .map(|(i, needed)| {
                    (quantity, vec![RecipeIngredient {
                        stock_item_id: Uuid::from_u128(i as u128 + 1),
                        stock_item_name: format!("item-{}", i),
                        unit: "unit".to_string(),
                        quantity_needed: *needed,
                        current_stock: dec("100"),
                        is_critical: false,
                    }])
                })
                .collect();

            let requirements = aggregate_requirements(&lines);

            let aggregated: Decimal = requirements.iter().map(|r| r.quantity_needed).sum();
            let expected: Decimal = needs
                .iter()
                .map(|n| *n * Decimal::from(quantity))
                .sum();

            prop_assert_eq!(requirements.len(), needs.len());
            prop_assert_eq!(aggregated, expected);
        }

        /// Deduct-then-restore always round-trips the stock level
        #[test]
        fn prop_deduct_restore_round_trips(
            initial in quantity_strategy(),
            extra in quantity_strategy()
        ) {
            use super::ledger_simulation::Ledger;

            let item = Uuid::from_u128(1);
            // Stock always covers the draw: draw = initial, stock = initial + extra
            let stock = initial + extra;
            let mut ledger = Ledger::with_stock(&[(item, stock)]);

            let requirement = StockRequirement {
                stock_item_id: item,
                stock_item_name: "item".to_string(),
                unit: "unit".to_string(),
                quantity_needed: initial,
                current_stock: stock,
                is_critical: false,
            };

            ledger.deduct_for_order(&[requirement], 1).unwrap();
            prop_assert_eq!(ledger.stock[&item], extra);

            ledger.restore_for_order(1);
            prop_assert_eq!(ledger.stock[&item], stock);
        }
    }
}
