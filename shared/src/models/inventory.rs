//! Distributor inventory models

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product listed by a distributor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryProduct {
    pub id: i64,
    pub distributor_id: String,
    pub distributor_name: String,
    pub distributor_phone: Option<String>,
    pub product_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Decimal,
    /// Units on hand
    pub quantity: u32,
    /// Minimum order quantity per order line
    pub moq: u32,
    /// Free text, e.g. "2-4 days"
    pub lead_time: Option<String>,
    pub service_areas: BTreeSet<String>,
    pub payment_modes: BTreeSet<String>,
    pub seller_note: Option<String>,
    pub image_url: Option<String>,
    pub show_in_offers: bool,
    pub created_at: DateTime<Utc>,
}

impl InventoryProduct {
    /// Buyers only see enabled products that are in stock
    pub fn is_available(&self) -> bool {
        is_offer_visible(self.show_in_offers, self.quantity)
    }

    /// Whether a delivery address lies in one of the listed service areas
    ///
    /// An address matches when it names an area, ignoring case. Listings
    /// without service areas deliver anywhere.
    pub fn serves_area(&self, address: &str) -> bool {
        if self.service_areas.is_empty() {
            return true;
        }
        let address = address.to_lowercase();
        self.service_areas
            .iter()
            .any(|area| address.contains(&area.trim().to_lowercase()))
    }

    pub fn accepts_payment_mode(&self, mode: &str) -> bool {
        self.payment_modes.iter().any(|m| m.eq_ignore_ascii_case(mode))
    }
}

pub fn is_offer_visible(show_in_offers: bool, quantity: u32) -> bool {
    show_in_offers && quantity > 0
}

/// Apply a signed adjustment to a quantity, clamping at zero
pub fn adjust_quantity(quantity: u32, delta: i64) -> u32 {
    let adjusted = i64::from(quantity).saturating_add(delta);
    adjusted.clamp(0, i64::from(u32::MAX)) as u32
}

/// Payment modes offered on the add-product form
pub const DEFAULT_PAYMENT_MODES: &[&str] = &["COD", "UPI", "Netbanking"];

/// MOQ pre-filled on the add-product form
pub const DEFAULT_MOQ: u32 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_visibility() {
        assert!(is_offer_visible(true, 1));
        assert!(!is_offer_visible(true, 0));
        assert!(!is_offer_visible(false, 10));
    }

    #[test]
    fn test_serves_area() {
        let mut product = InventoryProduct {
            id: 1,
            distributor_id: "1".to_string(),
            distributor_name: "Maa Durga Enterprises".to_string(),
            distributor_phone: None,
            product_name: "ORS Sachets".to_string(),
            description: None,
            category: None,
            unit_price: Decimal::from(12),
            quantity: 100,
            moq: DEFAULT_MOQ,
            lead_time: None,
            service_areas: BTreeSet::new(),
            payment_modes: BTreeSet::new(),
            seller_note: None,
            image_url: None,
            show_in_offers: true,
            created_at: Utc::now(),
        };
        assert!(product.serves_area("Anywhere"));

        product.service_areas = BTreeSet::from(["Cuttack".to_string(), "Khordha".to_string()]);
        assert!(product.serves_area("Rampur Block, CUTTACK"));
        assert!(product.serves_area("khordha"));
        assert!(!product.serves_area("Puri"));
    }

    #[test]
    fn test_adjust_quantity_clamps() {
        assert_eq!(adjust_quantity(5, 1), 6);
        assert_eq!(adjust_quantity(5, -1), 4);
        assert_eq!(adjust_quantity(0, -1), 0);
        assert_eq!(adjust_quantity(3, -100), 0);
        assert_eq!(adjust_quantity(u32::MAX, 1), u32::MAX);
    }
}
