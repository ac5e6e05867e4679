//! WebAssembly module for the Cafe POS platform
//!
//! Provides client-side computation for:
//! - Cart totals while building an order
//! - Production capacity badges on product cards
//! - Stock level classification
//! - Offline data validation

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Calculate a cart total from `[ [unit_price, quantity], ... ]` JSON
#[wasm_bindgen]
pub fn calculate_cart_total(lines_json: &str) -> Result<f64, JsValue> {
    let lines: Vec<(f64, u32)> = serde_json::from_str(lines_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid cart JSON: {}", e)))?;

    let decimal_lines: Vec<(Decimal, u32)> = lines
        .into_iter()
        .map(|(price, quantity)| {
            Decimal::try_from(price)
                .map(|price| (price, quantity))
                .map_err(|e| JsValue::from_str(&format!("Invalid price: {}", e)))
        })
        .collect::<Result<_, _>>()?;

    let total = order_total(&decimal_lines);
    Ok(total.to_f64().unwrap_or(0.0))
}

/// Compute producible portions from a recipe JSON
/// (an array of `RecipeIngredient`). Returns -1 for unlimited.
#[wasm_bindgen]
pub fn calculate_production_capacity(recipe_json: &str) -> Result<f64, JsValue> {
    let recipe: Vec<RecipeIngredient> = serde_json::from_str(recipe_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid recipe JSON: {}", e)))?;

    let capacity = production_capacity(&recipe).map_err(JsValue::from_str)?;

    Ok(match capacity {
        ProductionCapacity::Unlimited => -1.0,
        ProductionCapacity::Limited { portions } => portions as f64,
    })
}

/// Classify a stock level against its minimum threshold ("ok", "low", "out")
#[wasm_bindgen]
pub fn classify_stock(current_stock: f64, min_stock_level: f64) -> String {
    let current = Decimal::try_from(current_stock).unwrap_or(Decimal::ZERO);
    let min = Decimal::try_from(min_stock_level).unwrap_or(Decimal::ZERO);

    match classify_stock_level(current, min) {
        StockLevel::Ok => "ok".to_string(),
        StockLevel::Low => "low".to_string(),
        StockLevel::Out => "out".to_string(),
    }
}

/// Validate an order line quantity before it reaches the server
#[wasm_bindgen]
pub fn is_valid_order_quantity(quantity: u32) -> bool {
    validate_order_quantity(quantity).is_ok()
}

/// Validate min/max stock levels in the stock item form
#[wasm_bindgen]
pub fn are_valid_stock_levels(min_level: f64, max_level: f64) -> bool {
    let min = match Decimal::try_from(min_level) {
        Ok(v) => v,
        Err(_) => return false,
    };
    let max = match Decimal::try_from(max_level) {
        Ok(v) => v,
        Err(_) => return false,
    };
    validate_stock_levels(min, max).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_cart_total() {
        let total = calculate_cart_total("[[12.5, 2], [8.0, 1]]").unwrap();
        assert!((total - 33.0).abs() < 0.001);
    }

    #[test]
    fn test_capacity_unlimited_for_empty_recipe() {
        let capacity = calculate_production_capacity("[]").unwrap();
        assert_eq!(capacity, -1.0);
    }

    #[test]
    fn test_classify_stock() {
        assert_eq!(classify_stock(0.0, 5.0), "out");
        assert_eq!(classify_stock(3.0, 5.0), "low");
        assert_eq!(classify_stock(10.0, 5.0), "ok");
    }

    #[test]
    fn test_order_quantity_validation() {
        assert!(is_valid_order_quantity(1));
        assert!(!is_valid_order_quantity(0));
    }

    #[test]
    fn test_stock_level_validation() {
        assert!(are_valid_stock_levels(5.0, 20.0));
        assert!(are_valid_stock_levels(5.0, 0.0));
        assert!(!are_valid_stock_levels(5.0, 3.0));
    }
}
