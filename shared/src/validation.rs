//! Validation utilities for the rural storefront
//!
//! Field checks applied before anything is stored or sent to the backend.

use rust_decimal::Decimal;

// ============================================================================
// Product Validations
// ============================================================================

/// Validate that a product name is present
pub fn validate_product_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Product name is required");
    }
    Ok(())
}

/// Validate that a unit price is positive
pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Unit price must be greater than zero");
    }
    Ok(())
}

// ============================================================================
// Order Validations
// ============================================================================

/// Validate an order quantity against the product MOQ
///
/// Stock on hand is checked by the caller, which reports it as its own error.
pub fn validate_order_quantity(quantity: u32, moq: u32) -> Result<(), &'static str> {
    if quantity == 0 {
        return Err("Please enter a valid quantity");
    }
    if quantity < moq {
        return Err("Quantity is below the minimum order quantity");
    }
    Ok(())
}

// ============================================================================
// Stock Validations
// ============================================================================

/// Stock can only be reduced manually, never increased
pub fn validate_stock_edit(current: u32, new_quantity: u32) -> Result<(), &'static str> {
    if new_quantity > current {
        return Err("You can only reduce stock quantity, not increase it");
    }
    Ok(())
}

/// Validate a local sale against stock on hand
pub fn validate_local_sale(on_hand: u32, sold: u32) -> Result<(), &'static str> {
    if sold == 0 {
        return Err("Sale quantity must be greater than zero");
    }
    if sold > on_hand {
        return Err("Cannot sell more than the stock on hand");
    }
    Ok(())
}

// ============================================================================
// Settings Validations
// ============================================================================

/// Canonical form of a backend base URL: trimmed, no trailing slashes
pub fn normalize_api_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

/// Validate a backend base URL after normalizing it
pub fn validate_api_url(url: &str) -> Result<(), &'static str> {
    let url = normalize_api_url(url);
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or("URL must start with http:// or https://")?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err("URL must include a host");
    }
    Ok(())
}
