//! Order lifecycle tests
//!
//! Tests for order totals and the status state machine that gates the
//! stock depletion/restoration triggers.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{order_total, OrderStatus};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Order total is the sum of line totals
    #[test]
    fn test_order_total() {
        let lines = vec![(dec("45.50"), 2), (dec("12.00"), 3), (dec("8.25"), 1)];
        // 91.00 + 36.00 + 8.25
        assert_eq!(order_total(&lines), dec("135.25"));
    }

    /// An empty order totals zero
    #[test]
    fn test_empty_order_total() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    /// The forward path: active -> ready -> completed
    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));
        // The cashier can close an order the kitchen never marked ready
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Completed));
    }

    /// Cancellation is reachable from active and ready only
    #[test]
    fn test_cancellation_reachability() {
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    /// Terminal states admit no further transitions
    #[test]
    fn test_terminal_states_are_final() {
        let all = [
            OrderStatus::Active,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ];

        for target in all {
            assert!(!OrderStatus::Completed.can_transition_to(target));
            assert!(!OrderStatus::Cancelled.can_transition_to(target));
        }

        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Active.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    /// No backward movement in the lifecycle
    #[test]
    fn test_no_backward_transitions() {
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Active));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Active));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    fn quantity_strategy() -> impl Strategy<Value = u32> {
        1u32..=20
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The total equals the fold of unit_price * quantity
        #[test]
        fn prop_order_total_matches_fold(
            lines in prop::collection::vec((price_strategy(), quantity_strategy()), 0..15)
        ) {
            let expected: Decimal = lines
                .iter()
                .map(|(price, quantity)| *price * Decimal::from(*quantity))
                .sum();

            prop_assert_eq!(order_total(&lines), expected);
        }

        /// Totals are additive over order concatenation
        #[test]
        fn prop_order_total_additive(
            first in prop::collection::vec((price_strategy(), quantity_strategy()), 0..10),
            second in prop::collection::vec((price_strategy(), quantity_strategy()), 0..10)
        ) {
            let mut combined = first.clone();
            combined.extend(second.iter().cloned());

            prop_assert_eq!(
                order_total(&combined),
                order_total(&first) + order_total(&second)
            );
        }

        /// Exactly one terminal state is reachable per transition, and
        /// every non-terminal state can reach cancellation
        #[test]
        fn prop_open_states_can_cancel(state_idx in 0usize..2) {
            let open_states = [OrderStatus::Active, OrderStatus::Ready];
            let state = open_states[state_idx];

            prop_assert!(state.can_transition_to(OrderStatus::Cancelled));
            prop_assert!(state.can_transition_to(OrderStatus::Completed));
        }
    }
}
