//! Order fulfillment across orders, inventory and stock
//!
//! A delivery is the only event that touches all three stores: the order
//! becomes `delivered`, the distributor's listing loses the ordered units and
//! the orderer's ledger gains them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::{validate_order_quantity, InventoryProduct, Order, OrdererType, UserStock};

use crate::error::{AppError, AppResult};
use crate::services::{
    InventoryService, NewOrder, NewStockEntry, OrderDetailsUpdate, OrderService, StockLedger,
};

/// All storefront state, constructed once and passed by reference
#[derive(Debug, Default)]
pub struct Storefront {
    pub orders: OrderService,
    pub inventory: InventoryService,
    /// Ledgers keyed by orderer name
    ledgers: BTreeMap<String, StockLedger>,
}

/// A buyer's order for a listed product
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub product_id: i64,
    pub quantity: u32,
    pub orderer_name: String,
    #[serde(default)]
    pub orderer_type: OrdererType,
    pub user_id: Option<String>,
    pub payment_mode: Option<String>,
    pub delivery_address: Option<String>,
}

/// Result of a delivery
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub order: Order,
    /// `None` when the ordered product is no longer listed
    pub product: Option<InventoryProduct>,
    pub stock: UserStock,
}

impl Storefront {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an order against an offered product at its listed price
    pub fn place_order(&mut self, request: PlaceOrderRequest) -> AppResult<Order> {
        let product = self.inventory.get_product(request.product_id)?;
        check_order(
            product,
            request.quantity,
            request.payment_mode.as_deref(),
            request.delivery_address.as_deref(),
        )?;

        let input = NewOrder {
            orderer_name: request.orderer_name,
            orderer_type: request.orderer_type,
            user_id: request.user_id,
            product_id: Some(product.id),
            product_name: product.product_name.clone(),
            quantity: request.quantity,
            price_per_unit: product.unit_price,
            distributor_id: product.distributor_id.clone(),
            distributor_name: product.distributor_name.clone(),
            distributor_phone: product.distributor_phone.clone(),
            payment_mode: request.payment_mode,
            delivery_address: request.delivery_address,
        };
        Ok(self.orders.add_order(input))
    }

    /// Accept an order, then attach any details the distributor filled in
    pub fn accept_order(
        &mut self,
        order_id: i64,
        details: Option<OrderDetailsUpdate>,
    ) -> AppResult<Order> {
        let order = self.orders.accept(order_id)?;
        match details {
            Some(details) => self.orders.update_order_details(order_id, details),
            None => Ok(order),
        }
    }

    pub fn dispatch_order(&mut self, order_id: i64) -> AppResult<Order> {
        self.orders.dispatch(order_id)
    }

    /// Reject an order; `rejected` is terminal
    pub fn reject_order(&mut self, order_id: i64) -> AppResult<Order> {
        self.orders.reject(order_id)
    }

    /// Deliver an order and move its units from inventory into the orderer's stock
    pub fn deliver_order(&mut self, order_id: i64) -> AppResult<Delivery> {
        let order = self.orders.deliver(order_id)?;

        let product_id = order.product_id.or_else(|| {
            self.inventory
                .find_by_name(&order.product_name, &order.distributor_name)
                .map(|p| p.id)
        });
        let product = match product_id {
            Some(id) => match self.inventory.reduce_inventory(id, order.quantity) {
                Ok(product) => Some(product),
                Err(AppError::NotFound(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        if product.is_none() {
            tracing::warn!(order_id, product = %order.product_name, "Delivered product no longer listed");
        }

        let stock = self
            .ledgers
            .entry(order.orderer_name.clone())
            .or_default()
            .add_to_user_stock(NewStockEntry {
                product_name: order.product_name.clone(),
                category: product.as_ref().and_then(|p| p.category.clone()),
                quantity: order.quantity,
                distributor_name: order.distributor_name.clone(),
                order_id: Some(order.id),
            });

        tracing::info!(
            order_id,
            orderer = %order.orderer_name,
            quantity = order.quantity,
            "Order delivered and stock reconciled"
        );

        Ok(Delivery { order, product, stock })
    }

    /// An orderer's ledger, if they have received anything
    pub fn stock_for(&self, owner: &str) -> Option<&StockLedger> {
        self.ledgers.get(owner)
    }

    /// An orderer's ledger, created empty on first use
    pub fn stock_for_mut(&mut self, owner: &str) -> &mut StockLedger {
        self.ledgers.entry(owner.to_string()).or_default()
    }
}

/// Checks an order must pass before it is placed, locally or on the backend
pub(crate) fn check_order(
    product: &InventoryProduct,
    quantity: u32,
    payment_mode: Option<&str>,
    delivery_address: Option<&str>,
) -> AppResult<()> {
    if !product.show_in_offers {
        return Err(AppError::validation(
            "product_id",
            format!("{} is not offered for sale", product.product_name),
        ));
    }
    validate_order_quantity(quantity, product.moq)
        .map_err(|msg| AppError::validation("quantity", msg))?;
    if quantity > product.quantity {
        return Err(AppError::InsufficientInventory(format!(
            "{} units of {} requested, {} available",
            quantity, product.product_name, product.quantity
        )));
    }

    if let Some(mode) = payment_mode {
        if !product.payment_modes.is_empty() && !product.accepts_payment_mode(mode) {
            return Err(AppError::validation(
                "payment_mode",
                format!("{} does not accept {}", product.distributor_name, mode),
            ));
        }
    }
    if let Some(address) = delivery_address {
        if !product.serves_area(address) {
            return Err(AppError::validation(
                "delivery_address",
                format!("{} does not deliver to {}", product.distributor_name, address),
            ));
        }
    }
    Ok(())
}
