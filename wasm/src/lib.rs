//! WebAssembly module for the Rural Storefront
//!
//! Provides client-side checks for the mobile front end:
//! - Order totals and status transitions
//! - Offer visibility
//! - Stock edit and backend URL validation

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::OrderStatus;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::{InventoryProduct, Order, UserStock};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("storefront-wasm ready"));
}

/// Order total for `quantity` units at `price_per_unit`
#[wasm_bindgen]
pub fn calculate_order_total(quantity: u32, price_per_unit: f64) -> Result<f64, JsValue> {
    order_total(quantity, price_per_unit).map_err(|e| JsValue::from_str(&e))
}

fn order_total(quantity: u32, price_per_unit: f64) -> Result<f64, String> {
    if !price_per_unit.is_finite() || price_per_unit < 0.0 {
        return Err(format!("Invalid price per unit: {}", price_per_unit));
    }
    let price = Decimal::try_from(price_per_unit)
        .map_err(|e| format!("Invalid price per unit: {}", e))?;
    shared::calculate_order_total(quantity, price)
        .to_f64()
        .ok_or_else(|| "Order total out of range".to_string())
}

/// Next status on the happy path, or nothing for terminal or unknown statuses
#[wasm_bindgen]
pub fn next_order_status(status: &str) -> Option<String> {
    let status: OrderStatus = status.parse().ok()?;
    status.next().map(|s| s.to_string())
}

#[wasm_bindgen]
pub fn can_transition_order(from: &str, to: &str) -> bool {
    match (from.parse::<OrderStatus>(), to.parse::<OrderStatus>()) {
        (Ok(from), Ok(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// Statuses an order may move to from `status`
#[wasm_bindgen]
pub fn allowed_order_statuses(status: &str) -> js_sys::Array {
    let allowed = js_sys::Array::new();
    if let Ok(from) = status.parse::<OrderStatus>() {
        for to in OrderStatus::ALL.iter().filter(|to| from.can_transition_to(**to)) {
            allowed.push(&JsValue::from_str(to.as_str()));
        }
    }
    allowed
}

/// Whether buyers see the product in the offers list
#[wasm_bindgen]
pub fn is_offer_visible(show_in_offers: bool, quantity: u32) -> bool {
    shared::is_offer_visible(show_in_offers, quantity)
}

/// Error message for a manual stock edit, or nothing if it is allowed
#[wasm_bindgen]
pub fn validate_stock_edit(current: u32, new_quantity: u32) -> Option<String> {
    shared::validate_stock_edit(current, new_quantity)
        .err()
        .map(str::to_string)
}

/// Error message for a backend URL, or nothing if it is usable
#[wasm_bindgen]
pub fn validate_api_url(url: &str) -> Option<String> {
    shared::validate_api_url(url).err().map(str::to_string)
}
