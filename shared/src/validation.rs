//! Validation utilities for the Cafe POS platform

use rust_decimal::Decimal;

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate that a requested quantity is positive
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate min/max stock levels. A max of zero means "no maximum".
pub fn validate_stock_levels(min_level: Decimal, max_level: Decimal) -> Result<(), &'static str> {
    if min_level < Decimal::ZERO {
        return Err("Minimum stock level cannot be negative");
    }
    if max_level > Decimal::ZERO && max_level < min_level {
        return Err("Maximum stock level must be at least the minimum level");
    }
    Ok(())
}

/// Validate a unit cost
pub fn validate_unit_cost(unit_cost: Decimal) -> Result<(), &'static str> {
    if unit_cost < Decimal::ZERO {
        return Err("Unit cost cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Menu / Order Validations
// ============================================================================

/// Validate a product price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate an order line quantity
pub fn validate_order_quantity(quantity: u32) -> Result<(), &'static str> {
    if quantity == 0 {
        return Err("Order quantity must be at least 1");
    }
    Ok(())
}

/// Validate a table number and seat capacity
pub fn validate_table(table_number: i32, capacity: i32) -> Result<(), &'static str> {
    if table_number <= 0 {
        return Err("Table number must be positive");
    }
    if capacity <= 0 {
        return Err("Table capacity must be positive");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a password meets the minimum policy
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(dec("0.5")).is_ok());
        assert!(validate_quantity(Decimal::ZERO).is_err());
        assert!(validate_quantity(dec("-1")).is_err());
    }

    #[test]
    fn test_validate_stock_levels() {
        assert!(validate_stock_levels(dec("5"), dec("20")).is_ok());
        // Zero max means unbounded
        assert!(validate_stock_levels(dec("5"), Decimal::ZERO).is_ok());
        assert!(validate_stock_levels(dec("5"), dec("3")).is_err());
        assert!(validate_stock_levels(dec("-1"), dec("3")).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("garson@cafe.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_validate_table() {
        assert!(validate_table(1, 4).is_ok());
        assert!(validate_table(0, 4).is_err());
        assert!(validate_table(3, 0).is_err());
    }
}
