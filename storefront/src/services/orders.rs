//! Order lifecycle service
//!
//! Owns the order book and moves orders through
//! `placed -> accepted -> dispatched -> delivered` (or `placed -> rejected`).
//! Every status change goes through [`OrderStatus::transition`], so illegal
//! jumps are reported instead of silently applied.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Order, OrderStatus, OrdererType};

use crate::error::{AppError, AppResult};

/// In-memory order book
#[derive(Debug, Default)]
pub struct OrderService {
    /// Newest first
    orders: Vec<Order>,
    last_id: i64,
}

/// Input for placing an order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrder {
    pub orderer_name: String,
    #[serde(default)]
    pub orderer_type: OrdererType,
    pub user_id: Option<String>,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: u32,
    pub price_per_unit: Decimal,
    pub distributor_id: String,
    pub distributor_name: String,
    pub distributor_phone: Option<String>,
    pub payment_mode: Option<String>,
    pub delivery_address: Option<String>,
}

/// Fields a distributor may attach or correct after the order exists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDetailsUpdate {
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub quantity: Option<u32>,
    pub price_per_unit: Option<Decimal>,
    pub distributor_phone: Option<String>,
    pub payment_mode: Option<String>,
    pub delivery_address: Option<String>,
}

impl OrderService {
    /// Create an empty order book
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new order in the `placed` state
    pub fn add_order(&mut self, input: NewOrder) -> Order {
        self.last_id += 1;
        let now = Utc::now();

        let mut order = Order {
            id: self.last_id,
            order_ref: None,
            orderer_name: input.orderer_name,
            orderer_type: input.orderer_type,
            user_id: input.user_id,
            product_id: input.product_id,
            product_name: input.product_name,
            quantity: input.quantity,
            price_per_unit: input.price_per_unit,
            total_price: Decimal::ZERO,
            distributor_id: input.distributor_id,
            distributor_name: input.distributor_name,
            distributor_phone: input.distributor_phone,
            payment_mode: input.payment_mode,
            delivery_address: input.delivery_address,
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
        };
        order.recalculate_total();

        tracing::info!(
            order_id = order.id,
            orderer = %order.orderer_name,
            product = %order.product_name,
            quantity = order.quantity,
            total = %order.total_price,
            "Order placed"
        );

        self.orders.insert(0, order.clone());
        order
    }

    /// Move an order to a new status
    ///
    /// Fails with [`AppError::InvalidStateTransition`] when the move is not
    /// the next step of the lifecycle; the order is left unchanged.
    pub fn update_order_status(&mut self, order_id: i64, status: OrderStatus) -> AppResult<Order> {
        let order = self.find_mut(order_id)?;
        let from = order.status;
        order.status = from.transition(status)?;
        order.updated_at = Utc::now();

        tracing::info!(order_id, from = %from, to = %status, "Order status updated");
        Ok(order.clone())
    }

    /// Merge details into an order and recompute its total
    pub fn update_order_details(
        &mut self,
        order_id: i64,
        details: OrderDetailsUpdate,
    ) -> AppResult<Order> {
        let order = self.find_mut(order_id)?;

        if let Some(product_id) = details.product_id {
            order.product_id = Some(product_id);
        }
        if let Some(product_name) = details.product_name {
            order.product_name = product_name;
        }
        if let Some(quantity) = details.quantity {
            order.quantity = quantity;
        }
        if let Some(price) = details.price_per_unit {
            order.price_per_unit = price;
        }
        if let Some(phone) = details.distributor_phone {
            order.distributor_phone = Some(phone);
        }
        if let Some(mode) = details.payment_mode {
            order.payment_mode = Some(mode);
        }
        if let Some(address) = details.delivery_address {
            order.delivery_address = Some(address);
        }
        order.recalculate_total();
        order.updated_at = Utc::now();

        tracing::debug!(order_id, total = %order.total_price, "Order details updated");
        Ok(order.clone())
    }

    pub fn accept(&mut self, order_id: i64) -> AppResult<Order> {
        self.update_order_status(order_id, OrderStatus::Accepted)
    }

    pub fn dispatch(&mut self, order_id: i64) -> AppResult<Order> {
        self.update_order_status(order_id, OrderStatus::Dispatched)
    }

    pub fn deliver(&mut self, order_id: i64) -> AppResult<Order> {
        self.update_order_status(order_id, OrderStatus::Delivered)
    }

    pub fn reject(&mut self, order_id: i64) -> AppResult<Order> {
        self.update_order_status(order_id, OrderStatus::Rejected)
    }

    pub fn get_order(&self, order_id: i64) -> AppResult<&Order> {
        self.orders
            .iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))
    }

    /// All orders, newest first
    pub fn list_orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get_orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect()
    }

    pub fn get_orders_by_distributor(&self, distributor_id: &str) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.distributor_id == distributor_id)
            .cloned()
            .collect()
    }

    pub fn get_orders_by_orderer(&self, orderer_name: &str) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.orderer_name == orderer_name)
            .cloned()
            .collect()
    }

    fn find_mut(&mut self, order_id: i64) -> AppResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))
    }
}
