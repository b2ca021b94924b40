//! Stock ledger tests
//!
//! Tests for received stock including:
//! - Deliveries of the same product from the same distributor merge
//! - Manual edits may only reduce a record
//! - Local sales draw stock down

use proptest::prelude::*;
use storefront::services::{NewStockEntry, StockLedger, StockUpdate};
use storefront::AppError;

fn entry(product: &str, distributor: &str, quantity: u32) -> NewStockEntry {
    NewStockEntry {
        product_name: product.to_string(),
        category: None,
        quantity,
        distributor_name: distributor.to_string(),
        order_id: None,
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn product_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Reusable Pads - 8 pack".to_string()),
        Just("Iron Folic Acid Tablets".to_string()),
        Just("ORS Sachets".to_string()),
    ]
}

fn distributor_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Maa Durga Enterprises".to_string()),
        Just("Odisha Health Supplies".to_string()),
    ]
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_same_product_and_distributor_merge() {
        let mut ledger = StockLedger::new();
        let first = ledger.add_to_user_stock(entry("ORS Sachets", "Maa Durga Enterprises", 30));
        let merged = ledger.add_to_user_stock(entry("ORS Sachets", "Maa Durga Enterprises", 20));

        assert_eq!(merged.id, first.id);
        assert_eq!(merged.quantity, 50);
        assert_eq!(ledger.get_user_stocks().len(), 1);
    }

    #[test]
    fn test_different_distributor_keeps_separate_record() {
        let mut ledger = StockLedger::new();
        ledger.add_to_user_stock(entry("ORS Sachets", "Maa Durga Enterprises", 30));
        ledger.add_to_user_stock(entry("ORS Sachets", "Odisha Health Supplies", 20));

        assert_eq!(ledger.get_user_stocks().len(), 2);
        assert_eq!(ledger.total_units(), 50);
    }

    #[test]
    fn test_stock_edit_cannot_increase() {
        let mut ledger = StockLedger::new();
        let stock = ledger.add_to_user_stock(entry("ORS Sachets", "Maa Durga Enterprises", 20));

        let err = ledger
            .update_user_stock(
                stock.id,
                StockUpdate {
                    quantity: Some(25),
                    ..Default::default()
                },
            )
            .unwrap_err();
        match err {
            AppError::Validation { message, .. } => {
                assert_eq!(message, "You can only reduce stock quantity, not increase it")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger.get_stock(stock.id).unwrap().quantity, 20);

        let reduced = ledger
            .update_user_stock(
                stock.id,
                StockUpdate {
                    quantity: Some(12),
                    category: Some("Hydration".to_string()),
                },
            )
            .unwrap();
        assert_eq!(reduced.quantity, 12);
        assert_eq!(reduced.category.as_deref(), Some("Hydration"));
    }

    #[test]
    fn test_local_sale() {
        let mut ledger = StockLedger::new();
        let stock = ledger.add_to_user_stock(entry("ORS Sachets", "Maa Durga Enterprises", 20));

        assert_eq!(ledger.record_local_sale(stock.id, 8).unwrap().quantity, 12);
        assert!(ledger.record_local_sale(stock.id, 13).is_err());
        assert!(ledger.record_local_sale(stock.id, 0).is_err());
        assert_eq!(ledger.get_stock(stock.id).unwrap().quantity, 12);
    }

    #[test]
    fn test_unknown_stock_not_found() {
        let mut ledger = StockLedger::new();
        assert!(matches!(ledger.get_stock(9), Err(AppError::NotFound(_))));
        assert!(matches!(
            ledger.update_user_stock(9, StockUpdate::default()),
            Err(AppError::NotFound(_))
        ));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// One record per (product, distributor), holding the sum of receipts
        #[test]
        fn prop_receipts_merge_per_product_and_distributor(
            receipts in prop::collection::vec(
                (product_strategy(), distributor_strategy(), 1u32..=500),
                1..25
            )
        ) {
            let mut ledger = StockLedger::new();
            let mut expected: BTreeMap<(String, String), u32> = BTreeMap::new();

            for (product, distributor, quantity) in receipts {
                ledger.add_to_user_stock(entry(&product, &distributor, quantity));
                *expected.entry((product, distributor)).or_default() += quantity;
            }

            let keys: BTreeSet<(String, String)> = ledger
                .get_user_stocks()
                .iter()
                .map(|s| (s.product_name.clone(), s.distributor_name.clone()))
                .collect();
            prop_assert_eq!(keys.len(), ledger.get_user_stocks().len());

            for stock in ledger.get_user_stocks() {
                let key = (stock.product_name.clone(), stock.distributor_name.clone());
                prop_assert_eq!(Some(&stock.quantity), expected.get(&key));
            }
        }

        /// Edits succeed exactly when they do not increase the quantity
        #[test]
        fn prop_stock_edit_only_reduces(current in 0u32..=1_000, requested in 0u32..=1_000) {
            let mut ledger = StockLedger::new();
            let stock = ledger.add_to_user_stock(entry("ORS Sachets", "Maa Durga Enterprises", current));

            let result = ledger.update_user_stock(
                stock.id,
                StockUpdate { quantity: Some(requested), ..Default::default() },
            );
            prop_assert_eq!(result.is_ok(), requested <= current);

            let after = ledger.get_stock(stock.id).unwrap().quantity;
            prop_assert_eq!(after, if requested <= current { requested } else { current });
        }
    }
}
