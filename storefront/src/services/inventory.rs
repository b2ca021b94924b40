//! Inventory service for distributor product listings

use std::collections::BTreeSet;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    adjust_quantity, validate_product_name, validate_unit_price, InventoryProduct,
    DEFAULT_MOQ, DEFAULT_PAYMENT_MODES,
};

use crate::error::{AppError, AppResult};

/// In-memory product listings of every distributor
#[derive(Debug, Default)]
pub struct InventoryService {
    /// Newest first
    products: Vec<InventoryProduct>,
    last_id: i64,
}

/// Input for adding a product
///
/// Missing fields take the add-product form defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewProduct {
    pub distributor_id: String,
    pub distributor_name: String,
    pub distributor_phone: Option<String>,
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub moq: u32,
    pub lead_time: Option<String>,
    pub service_areas: BTreeSet<String>,
    pub payment_modes: BTreeSet<String>,
    pub seller_note: Option<String>,
    pub image_url: Option<String>,
    pub show_in_offers: bool,
}

impl Default for NewProduct {
    fn default() -> Self {
        Self {
            distributor_id: String::new(),
            distributor_name: String::new(),
            distributor_phone: None,
            product_name: String::new(),
            description: None,
            category: None,
            unit_price: Decimal::ZERO,
            quantity: 0,
            moq: DEFAULT_MOQ,
            lead_time: None,
            service_areas: BTreeSet::new(),
            payment_modes: DEFAULT_PAYMENT_MODES.iter().map(|m| m.to_string()).collect(),
            seller_note: None,
            image_url: None,
            show_in_offers: false,
        }
    }
}

/// Partial product update, `None` keeps the current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<u32>,
    pub moq: Option<u32>,
    pub lead_time: Option<String>,
    pub service_areas: Option<BTreeSet<String>>,
    pub payment_modes: Option<BTreeSet<String>>,
    pub seller_note: Option<String>,
    pub image_url: Option<String>,
    pub show_in_offers: Option<bool>,
}

impl InventoryService {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product listing
    pub fn add_product(&mut self, input: NewProduct) -> AppResult<InventoryProduct> {
        validate_product_name(&input.product_name)
            .map_err(|msg| AppError::validation("product_name", msg))?;
        validate_unit_price(input.unit_price)
            .map_err(|msg| AppError::validation("unit_price", msg))?;

        self.last_id += 1;
        let product = InventoryProduct {
            id: self.last_id,
            distributor_id: input.distributor_id,
            distributor_name: input.distributor_name,
            distributor_phone: input.distributor_phone,
            product_name: input.product_name.trim().to_string(),
            description: input.description.map(|d| d.trim().to_string()),
            category: input.category,
            unit_price: input.unit_price,
            quantity: input.quantity,
            moq: input.moq,
            lead_time: input.lead_time,
            service_areas: input.service_areas,
            payment_modes: input.payment_modes,
            seller_note: input.seller_note,
            image_url: input.image_url,
            show_in_offers: input.show_in_offers,
            created_at: Utc::now(),
        };

        tracing::info!(
            product_id = product.id,
            distributor = %product.distributor_id,
            name = %product.product_name,
            quantity = product.quantity,
            "Product added"
        );

        self.products.insert(0, product.clone());
        Ok(product)
    }

    /// Shallow-merge an update into a product
    pub fn update_product(&mut self, product_id: i64, update: ProductUpdate) -> AppResult<InventoryProduct> {
        if let Some(name) = &update.product_name {
            validate_product_name(name).map_err(|msg| AppError::validation("product_name", msg))?;
        }
        if let Some(price) = update.unit_price {
            validate_unit_price(price).map_err(|msg| AppError::validation("unit_price", msg))?;
        }

        let product = self.find_mut(product_id)?;
        if let Some(name) = update.product_name {
            product.product_name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            product.description = Some(description);
        }
        if let Some(category) = update.category {
            product.category = Some(category);
        }
        if let Some(price) = update.unit_price {
            product.unit_price = price;
        }
        if let Some(quantity) = update.quantity {
            product.quantity = quantity;
        }
        if let Some(moq) = update.moq {
            product.moq = moq;
        }
        if let Some(lead_time) = update.lead_time {
            product.lead_time = Some(lead_time);
        }
        if let Some(areas) = update.service_areas {
            product.service_areas = areas;
        }
        if let Some(modes) = update.payment_modes {
            product.payment_modes = modes;
        }
        if let Some(note) = update.seller_note {
            product.seller_note = Some(note);
        }
        if let Some(url) = update.image_url {
            product.image_url = Some(url);
        }
        if let Some(show) = update.show_in_offers {
            product.show_in_offers = show;
        }

        tracing::debug!(product_id, "Product updated");
        Ok(product.clone())
    }

    /// Apply a +/- quantity adjustment, never going below zero
    pub fn adjust_quantity(&mut self, product_id: i64, delta: i64) -> AppResult<InventoryProduct> {
        let product = self.find_mut(product_id)?;
        product.quantity = adjust_quantity(product.quantity, delta);
        tracing::debug!(product_id, delta, quantity = product.quantity, "Quantity adjusted");
        Ok(product.clone())
    }

    pub fn set_show_in_offers(&mut self, product_id: i64, show: bool) -> AppResult<InventoryProduct> {
        self.update_product(
            product_id,
            ProductUpdate {
                show_in_offers: Some(show),
                ..Default::default()
            },
        )
    }

    /// Flip the offer visibility flag
    pub fn toggle_offer(&mut self, product_id: i64) -> AppResult<InventoryProduct> {
        let show = !self.get_product(product_id)?.show_in_offers;
        self.set_show_in_offers(product_id, show)
    }

    /// Remove `amount` units, clamping the result at zero
    pub fn reduce_inventory(&mut self, product_id: i64, amount: u32) -> AppResult<InventoryProduct> {
        let product = self.find_mut(product_id)?;
        let before = product.quantity;
        product.quantity = before.saturating_sub(amount);

        if amount > before {
            tracing::warn!(
                product_id,
                requested = amount,
                on_hand = before,
                "Inventory reduction exceeded stock on hand, clamped to zero"
            );
        } else {
            tracing::info!(product_id, amount, remaining = product.quantity, "Inventory reduced");
        }
        Ok(product.clone())
    }

    pub fn delete_product(&mut self, product_id: i64) -> AppResult<InventoryProduct> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;
        let removed = self.products.remove(index);
        tracing::info!(product_id, "Product deleted");
        Ok(removed)
    }

    pub fn get_product(&self, product_id: i64) -> AppResult<&InventoryProduct> {
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))
    }

    /// Find a listing by name and distributor name (exact match)
    pub fn find_by_name(&self, product_name: &str, distributor_name: &str) -> Option<&InventoryProduct> {
        self.products
            .iter()
            .find(|p| p.product_name == product_name && p.distributor_name == distributor_name)
    }

    pub fn list_products(&self) -> &[InventoryProduct] {
        &self.products
    }

    pub fn get_products_by_distributor(&self, distributor_id: &str) -> Vec<InventoryProduct> {
        self.products
            .iter()
            .filter(|p| p.distributor_id == distributor_id)
            .cloned()
            .collect()
    }

    /// Products buyers can see: offered and in stock
    pub fn get_available_products(&self) -> Vec<InventoryProduct> {
        self.products
            .iter()
            .filter(|p| p.is_available())
            .cloned()
            .collect()
    }

    fn find_mut(&mut self, product_id: i64) -> AppResult<&mut InventoryProduct> {
        self.products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))
    }
}
