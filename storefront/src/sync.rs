//! Backend-backed storefront state
//!
//! The backend is the only source of truth. [`RemoteStorefront`] keeps the
//! last fetched inventory, orders and stock for display, sends every change
//! to the backend, and refetches whatever the change may have touched. A
//! failed request leaves the cached data exactly as it was.

use std::collections::BTreeSet;

use shared::{
    adjust_quantity, validate_product_name, validate_stock_edit, validate_unit_price,
    InventoryProduct, Order, OrderStatus, UserStock,
};

use crate::error::{AppError, AppResult};
use crate::external::backend::{
    AddProductPayload, CreateOrderPayload, InventoryQuery, OrderQuery, UpdateProductPayload,
};
use crate::external::BackendClient;
use crate::services::fulfillment::check_order;
use crate::services::{NewProduct, ProductUpdate};

/// Cached view of the backend's data
#[derive(Debug)]
pub struct RemoteStorefront {
    client: BackendClient,
    inventory: Vec<InventoryProduct>,
    orders: Vec<Order>,
    stock: Vec<UserStock>,
    inventory_query: InventoryQuery,
    order_query: OrderQuery,
    stock_user: Option<String>,
    /// Caches whose refetch after a successful change failed
    stale: BTreeSet<&'static str>,
}

/// A buyer's order, checked against the cached listing before it is sent
#[derive(Debug, Clone)]
pub struct RemoteOrderRequest {
    pub product_id: i64,
    pub quantity: u32,
    pub user_id: String,
    pub payment_mode: String,
    pub delivery_address: String,
}

impl RemoteStorefront {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            inventory: Vec::new(),
            orders: Vec::new(),
            stock: Vec::new(),
            inventory_query: InventoryQuery::default(),
            order_query: OrderQuery::default(),
            stock_user: None,
            stale: BTreeSet::new(),
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn inventory(&self) -> &[InventoryProduct] {
        &self.inventory
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn stock(&self) -> &[UserStock] {
        &self.stock
    }

    /// True when the cache may not reflect the latest successful change
    pub fn is_stale(&self) -> bool {
        !self.stale.is_empty()
    }

    /// Cached products buyers can see
    pub fn available_products(&self) -> Vec<&InventoryProduct> {
        self.inventory.iter().filter(|p| p.is_available()).collect()
    }

    pub fn orders_by_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status == status).collect()
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    pub async fn refresh_inventory(&mut self, query: InventoryQuery) -> AppResult<&[InventoryProduct]> {
        let products = self.client.get_inventory(&query).await?;
        self.inventory = products.into_iter().map(InventoryProduct::from).collect();
        self.inventory_query = query;
        self.stale.remove("inventory");
        tracing::debug!(count = self.inventory.len(), "Inventory refreshed");
        Ok(&self.inventory)
    }

    pub async fn refresh_orders(&mut self, query: OrderQuery) -> AppResult<&[Order]> {
        let orders = self.client.get_orders(&query).await?;
        self.orders = orders.into_iter().map(Order::from).collect();
        self.order_query = query;
        self.stale.remove("orders");
        tracing::debug!(count = self.orders.len(), "Orders refreshed");
        Ok(&self.orders)
    }

    pub async fn refresh_stock(&mut self, user_id: &str) -> AppResult<&[UserStock]> {
        let stock = self.client.get_user_stock(user_id).await?;
        self.stock = stock.into_iter().map(UserStock::from).collect();
        self.stock_user = Some(user_id.to_string());
        self.stale.remove("stock");
        tracing::debug!(count = self.stock.len(), user_id, "Stock refreshed");
        Ok(&self.stock)
    }

    // ------------------------------------------------------------------------
    // Inventory changes
    // ------------------------------------------------------------------------

    pub async fn add_product(&mut self, input: NewProduct) -> AppResult<InventoryProduct> {
        reject_local_only_fields(input.description.as_deref(), input.seller_note.as_deref())?;
        validate_product_name(&input.product_name)
            .map_err(|msg| AppError::validation("product_name", msg))?;
        validate_unit_price(input.unit_price)
            .map_err(|msg| AppError::validation("unit_price", msg))?;

        let payload = AddProductPayload {
            distributor_id: input.distributor_id,
            product_name: input.product_name.trim().to_string(),
            category: input.category,
            price: input.unit_price,
            moq: input.moq,
            lead_time: input.lead_time,
            service_areas: input.service_areas.into_iter().collect(),
            payment_modes: input.payment_modes.into_iter().collect(),
            stock_quantity: input.quantity,
            is_enabled: input.show_in_offers,
            image_url: input.image_url,
        };
        let created = self.client.add_product(&payload).await?;
        tracing::info!(product_id = created.id, "Product added on backend");

        self.invalidate_inventory().await;
        Ok(created.into())
    }

    pub async fn update_product(&mut self, product_id: i64, update: ProductUpdate) -> AppResult<InventoryProduct> {
        reject_local_only_fields(update.description.as_deref(), update.seller_note.as_deref())?;
        if let Some(name) = &update.product_name {
            validate_product_name(name).map_err(|msg| AppError::validation("product_name", msg))?;
        }
        if let Some(price) = update.unit_price {
            validate_unit_price(price).map_err(|msg| AppError::validation("unit_price", msg))?;
        }

        let payload = UpdateProductPayload {
            product_name: update.product_name,
            category: update.category,
            price: update.unit_price,
            moq: update.moq,
            lead_time: update.lead_time,
            service_areas: update.service_areas.map(|s| s.into_iter().collect()),
            payment_modes: update.payment_modes.map(|s| s.into_iter().collect()),
            stock_quantity: update.quantity,
            is_enabled: update.show_in_offers,
            image_url: update.image_url,
        };
        let updated = self.client.update_product(product_id, &payload).await?;

        self.invalidate_inventory().await;
        Ok(updated.into())
    }

    /// The +/- buttons: adjust the cached quantity and send the result
    pub async fn adjust_quantity(&mut self, product_id: i64, delta: i64) -> AppResult<InventoryProduct> {
        let current = self.cached_product(product_id)?.quantity;
        let update = ProductUpdate {
            quantity: Some(adjust_quantity(current, delta)),
            ..Default::default()
        };
        self.update_product(product_id, update).await
    }

    pub async fn toggle_offer(&mut self, product_id: i64) -> AppResult<InventoryProduct> {
        let show = !self.cached_product(product_id)?.show_in_offers;
        let update = ProductUpdate {
            show_in_offers: Some(show),
            ..Default::default()
        };
        self.update_product(product_id, update).await
    }

    pub async fn delete_product(&mut self, product_id: i64) -> AppResult<()> {
        self.client.delete_product(product_id).await?;
        tracing::info!(product_id, "Product deleted on backend");
        self.invalidate_inventory().await;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Order changes
    // ------------------------------------------------------------------------

    /// Place an order for a cached product at its listed price
    pub async fn place_order(&mut self, request: RemoteOrderRequest) -> AppResult<Order> {
        let product = self.cached_product(request.product_id)?;
        check_order(
            product,
            request.quantity,
            Some(request.payment_mode.as_str()),
            Some(request.delivery_address.as_str()),
        )?;

        let payload = CreateOrderPayload {
            user_id: request.user_id,
            distributor_id: product.distributor_id.clone(),
            product_id: product.id,
            product_name: product.product_name.clone(),
            quantity: request.quantity,
            price: product.unit_price,
            payment_mode: request.payment_mode,
            delivery_address: request.delivery_address,
        };
        let created = self.client.create_order(&payload).await?;
        tracing::info!(order = %created.order_id, "Order created on backend");

        self.invalidate_orders().await;
        Ok(created.into())
    }

    pub async fn accept_order(&mut self, order_ref: &str) -> AppResult<Order> {
        self.check_transition(order_ref, OrderStatus::Accepted)?;
        let order = self.client.accept_order(order_ref).await?;
        self.invalidate_orders().await;
        Ok(order.into())
    }

    pub async fn dispatch_order(&mut self, order_ref: &str) -> AppResult<Order> {
        self.check_transition(order_ref, OrderStatus::Dispatched)?;
        let order = self.client.dispatch_order(order_ref).await?;
        self.invalidate_orders().await;
        Ok(order.into())
    }

    /// Deliver an order; the backend moves the units from inventory into
    /// the buyer's stock, so all three caches are refetched
    pub async fn deliver_order(&mut self, order_ref: &str) -> AppResult<Order> {
        self.check_transition(order_ref, OrderStatus::Delivered)?;
        let order = self.client.deliver_order(order_ref).await?;
        tracing::info!(order = %order_ref, quantity = order.quantity, "Order delivered on backend");

        self.invalidate_orders().await;
        self.invalidate_inventory().await;
        self.invalidate_stock().await;
        Ok(order.into())
    }

    // ------------------------------------------------------------------------
    // Stock changes
    // ------------------------------------------------------------------------

    /// Manually correct a stock record; the quantity may only go down
    pub async fn update_stock(&mut self, stock_id: i64, quantity: u32) -> AppResult<UserStock> {
        let current = self
            .stock
            .iter()
            .find(|s| s.id == stock_id)
            .ok_or_else(|| AppError::NotFound(format!("Stock {}", stock_id)))?;
        validate_stock_edit(current.quantity, quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;

        let updated = self.client.update_stock(stock_id, quantity).await?;
        self.invalidate_stock().await;
        Ok(updated.into())
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn cached_product(&self, product_id: i64) -> AppResult<&InventoryProduct> {
        self.inventory
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))
    }

    /// Reject an action the cached order status does not allow; orders not in
    /// the cache are left for the backend to judge
    fn check_transition(&self, order_ref: &str, to: OrderStatus) -> AppResult<()> {
        let cached = self
            .orders
            .iter()
            .find(|o| o.order_ref.as_deref() == Some(order_ref));
        if let Some(order) = cached {
            order.status.transition(to)?;
        }
        Ok(())
    }

    async fn invalidate_inventory(&mut self) {
        let query = self.inventory_query.clone();
        let result = self.refresh_inventory(query).await.map(|_| ());
        if let Err(e) = result {
            self.mark_stale("inventory", &e);
        }
    }

    async fn invalidate_orders(&mut self) {
        let query = self.order_query.clone();
        let result = self.refresh_orders(query).await.map(|_| ());
        if let Err(e) = result {
            self.mark_stale("orders", &e);
        }
    }

    async fn invalidate_stock(&mut self) {
        let Some(user_id) = self.stock_user.clone() else {
            return;
        };
        let result = self.refresh_stock(&user_id).await.map(|_| ());
        if let Err(e) = result {
            self.mark_stale("stock", &e);
        }
    }

    fn mark_stale(&mut self, cache: &'static str, error: &AppError) {
        tracing::warn!(cache, error = %error, "Refetch after change failed, cache is stale");
        self.stale.insert(cache);
    }
}

/// The backend has no columns for these; refuse them rather than lose them
fn reject_local_only_fields(description: Option<&str>, seller_note: Option<&str>) -> AppResult<()> {
    if description.is_some() {
        return Err(AppError::validation(
            "description",
            "The backend does not store product descriptions",
        ));
    }
    if seller_note.is_some() {
        return Err(AppError::validation(
            "seller_note",
            "The backend does not store seller notes",
        ));
    }
    Ok(())
}
