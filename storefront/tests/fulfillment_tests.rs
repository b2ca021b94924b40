//! Order fulfillment tests
//!
//! Tests for the path from order to received stock:
//! - Placing orders against offered listings
//! - Delivery reduces inventory and credits the orderer's ledger
//! - Conservation of units across inventory and stock

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{OrderStatus, OrdererType};
use std::collections::BTreeSet;
use storefront::services::{
    NewProduct, OrderDetailsUpdate, PlaceOrderRequest, ProductUpdate, Storefront,
};
use storefront::AppError;

const SHG: &str = "Sakhi Self Help Group";

fn storefront_with_pads(quantity: u32) -> (Storefront, i64) {
    let mut storefront = Storefront::new();
    let product = storefront
        .inventory
        .add_product(NewProduct {
            distributor_id: "1".to_string(),
            distributor_name: "Maa Durga Enterprises".to_string(),
            product_name: "Reusable Pads - 8 pack".to_string(),
            category: Some("Menstrual Health".to_string()),
            unit_price: Decimal::from(120),
            quantity,
            moq: 10,
            payment_modes: BTreeSet::from(["COD".to_string(), "UPI".to_string()]),
            show_in_offers: true,
            ..Default::default()
        })
        .unwrap();
    (storefront, product.id)
}

fn request(product_id: i64, quantity: u32) -> PlaceOrderRequest {
    PlaceOrderRequest {
        product_id,
        quantity,
        orderer_name: SHG.to_string(),
        orderer_type: OrdererType::Shg,
        user_id: None,
        payment_mode: Some("UPI".to_string()),
        delivery_address: Some("Rampur Block".to_string()),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_order_to_delivery_moves_units() {
        let (mut storefront, product_id) = storefront_with_pads(150);

        let order = storefront.place_order(request(product_id, 50)).unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.total_price, Decimal::from(6000));

        storefront.accept_order(order.id, None).unwrap();
        storefront.dispatch_order(order.id).unwrap();
        let delivery = storefront.deliver_order(order.id).unwrap();

        assert_eq!(delivery.order.status, OrderStatus::Delivered);
        assert_eq!(delivery.product.unwrap().quantity, 100);
        assert_eq!(delivery.stock.quantity, 50);
        assert_eq!(delivery.stock.category.as_deref(), Some("Menstrual Health"));
        assert_eq!(delivery.stock.order_id, Some(order.id));

        let ledger = storefront.stock_for(SHG).unwrap();
        assert_eq!(ledger.total_units(), 50);
        assert_eq!(storefront.inventory.get_product(product_id).unwrap().quantity, 100);
    }

    #[test]
    fn test_second_delivery_merges_stock() {
        let (mut storefront, product_id) = storefront_with_pads(150);

        for quantity in [50, 30] {
            let order = storefront.place_order(request(product_id, quantity)).unwrap();
            storefront.accept_order(order.id, None).unwrap();
            storefront.dispatch_order(order.id).unwrap();
            storefront.deliver_order(order.id).unwrap();
        }

        let ledger = storefront.stock_for(SHG).unwrap();
        assert_eq!(ledger.get_user_stocks().len(), 1);
        assert_eq!(ledger.get_user_stocks()[0].quantity, 80);
        assert_eq!(storefront.inventory.get_product(product_id).unwrap().quantity, 70);
    }

    #[test]
    fn test_deliver_before_dispatch_changes_nothing() {
        let (mut storefront, product_id) = storefront_with_pads(150);
        let order = storefront.place_order(request(product_id, 50)).unwrap();
        storefront.accept_order(order.id, None).unwrap();

        let err = storefront.deliver_order(order.id).unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition { .. }));
        assert_eq!(storefront.inventory.get_product(product_id).unwrap().quantity, 150);
        assert!(storefront.stock_for(SHG).is_none());
    }

    #[test]
    fn test_place_order_checks() {
        let (mut storefront, product_id) = storefront_with_pads(40);

        let err = storefront.place_order(request(product_id, 41)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientInventory(_)));

        let err = storefront.place_order(request(product_id, 5)).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));

        let mut netbanking = request(product_id, 10);
        netbanking.payment_mode = Some("Netbanking".to_string());
        let err = storefront.place_order(netbanking).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "payment_mode"));

        storefront.inventory.toggle_offer(product_id).unwrap();
        let err = storefront.place_order(request(product_id, 10)).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "product_id"));

        assert!(storefront.orders.list_orders().is_empty());
    }

    #[test]
    fn test_delivery_address_must_be_in_service_area() {
        let (mut storefront, product_id) = storefront_with_pads(150);
        storefront
            .inventory
            .update_product(
                product_id,
                ProductUpdate {
                    service_areas: Some(BTreeSet::from(["Cuttack".to_string()])),
                    ..Default::default()
                },
            )
            .unwrap();

        let err = storefront.place_order(request(product_id, 10)).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "delivery_address"));

        let mut in_area = request(product_id, 10);
        in_area.delivery_address = Some("Rampur Block, Cuttack".to_string());
        assert!(storefront.place_order(in_area).is_ok());
    }

    #[test]
    fn test_accept_with_details_recalculates_total() {
        let (mut storefront, product_id) = storefront_with_pads(150);
        let order = storefront.place_order(request(product_id, 50)).unwrap();

        let accepted = storefront
            .accept_order(
                order.id,
                Some(OrderDetailsUpdate {
                    price_per_unit: Some(Decimal::from(110)),
                    distributor_phone: Some("+919876543210".to_string()),
                    ..Default::default()
                }),
            )
            .unwrap();
        assert_eq!(accepted.status, OrderStatus::Accepted);
        assert_eq!(accepted.total_price, Decimal::from(5500));
    }

    #[test]
    fn test_rejected_order_never_touches_stock() {
        let (mut storefront, product_id) = storefront_with_pads(150);
        let order = storefront.place_order(request(product_id, 50)).unwrap();

        storefront.reject_order(order.id).unwrap();
        assert!(storefront.dispatch_order(order.id).is_err());
        assert!(storefront.deliver_order(order.id).is_err());
        assert_eq!(storefront.inventory.get_product(product_id).unwrap().quantity, 150);
    }

    #[test]
    fn test_delivery_of_delisted_product_still_credits_stock() {
        let (mut storefront, product_id) = storefront_with_pads(150);
        let order = storefront.place_order(request(product_id, 50)).unwrap();
        storefront.accept_order(order.id, None).unwrap();
        storefront.dispatch_order(order.id).unwrap();
        storefront.inventory.delete_product(product_id).unwrap();

        let delivery = storefront.deliver_order(order.id).unwrap();
        assert!(delivery.product.is_none());
        assert_eq!(delivery.stock.quantity, 50);
    }

    #[test]
    fn test_ledgers_are_per_orderer() {
        let (mut storefront, product_id) = storefront_with_pads(150);

        let mut pharmacy = request(product_id, 20);
        pharmacy.orderer_name = "City Pharmacy".to_string();
        pharmacy.orderer_type = OrdererType::Pharmacist;

        for req in [request(product_id, 10), pharmacy] {
            let order = storefront.place_order(req).unwrap();
            storefront.accept_order(order.id, None).unwrap();
            storefront.dispatch_order(order.id).unwrap();
            storefront.deliver_order(order.id).unwrap();
        }

        assert_eq!(storefront.stock_for(SHG).unwrap().total_units(), 10);
        assert_eq!(storefront.stock_for("City Pharmacy").unwrap().total_units(), 20);
        assert!(storefront.stock_for("Nobody").is_none());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Inventory plus delivered stock stays equal to the starting inventory
        #[test]
        fn prop_units_are_conserved_on_delivery(
            start in 10u32..=2_000,
            quantities in prop::collection::vec(10u32..=300, 1..8)
        ) {
            let (mut storefront, product_id) = storefront_with_pads(start);

            for quantity in quantities {
                let Ok(order) = storefront.place_order(request(product_id, quantity)) else {
                    continue;
                };
                storefront.accept_order(order.id, None).unwrap();
                storefront.dispatch_order(order.id).unwrap();
                storefront.deliver_order(order.id).unwrap();

                let on_hand = u64::from(storefront.inventory.get_product(product_id).unwrap().quantity);
                let received = storefront.stock_for(SHG).map(|l| l.total_units()).unwrap_or(0);
                prop_assert_eq!(on_hand + received, u64::from(start));
            }
        }
    }
}
