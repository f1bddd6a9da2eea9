//! Validation utilities for data entering the core from the outside
//!
//! External rows are validated here before any arithmetic touches them;
//! the core never operates on unchecked values.

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate a physical count entered on the stocktake sheet
pub fn validate_counted_qty(counted: f64) -> Result<(), &'static str> {
    if !counted.is_finite() {
        return Err("Counted quantity must be a finite number");
    }
    if counted < 0.0 {
        return Err("Counted quantity cannot be negative");
    }
    Ok(())
}

/// Validate a stock record loaded from the store before prediction
pub fn validate_stock_record(stock: f64, avg_consumption: f64) -> Result<(), &'static str> {
    if !stock.is_finite() || stock < 0.0 {
        return Err("Stock must be a non-negative number");
    }
    if !avg_consumption.is_finite() || avg_consumption < 0.0 {
        return Err("Average consumption must be a non-negative number");
    }
    Ok(())
}

/// Validate a safety-stock threshold
pub fn validate_safety_stock(safety_stock: f64) -> Result<(), &'static str> {
    if !safety_stock.is_finite() || safety_stock < 0.0 {
        return Err("Safety stock cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Ordering Validations
// ============================================================================

/// Validate a purchase-unit-to-base-unit conversion factor
pub fn validate_conversion_factor(factor: i64) -> Result<(), &'static str> {
    if factor < 1 {
        return Err("Conversion factor must be at least 1");
    }
    Ok(())
}

/// Validate a minimum order quantity
pub fn validate_moq(moq: i64) -> Result<(), &'static str> {
    if moq < 1 {
        return Err("MOQ must be at least 1");
    }
    Ok(())
}

/// Validate an ordered quantity in purchase units
pub fn validate_order_qty(qty: i64) -> Result<(), &'static str> {
    if qty < 1 {
        return Err("Order quantity must be at least 1");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a required display name (item, supplier, unit labels)
pub fn validate_required_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    if name.len() > 200 {
        return Err("Name must be at most 200 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counted_qty_rejects_negative_and_non_finite() {
        assert!(validate_counted_qty(0.0).is_ok());
        assert!(validate_counted_qty(12.5).is_ok());
        assert!(validate_counted_qty(-0.1).is_err());
        assert!(validate_counted_qty(f64::NAN).is_err());
    }

    #[test]
    fn conversion_factor_must_be_positive() {
        assert!(validate_conversion_factor(1).is_ok());
        assert!(validate_conversion_factor(12).is_ok());
        assert!(validate_conversion_factor(0).is_err());
        assert!(validate_conversion_factor(-3).is_err());
    }

    #[test]
    fn required_name_rejects_blank() {
        assert!(validate_required_name("원두 1kg").is_ok());
        assert!(validate_required_name("   ").is_err());
    }
}
