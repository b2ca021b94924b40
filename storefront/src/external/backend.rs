//! Storefront backend REST client
//!
//! Thin wrapper over the backend's JSON API. No retries and no auth headers:
//! a failed call is returned to the caller as-is.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::{
    calculate_order_total, InventoryProduct, Order, OrderStatus, OrdererType, UserStock,
};

use crate::error::{AppError, AppResult};

/// Backend API client
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

/// Product as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiProduct {
    pub id: i64,
    pub distributor_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub moq: u32,
    pub lead_time: Option<String>,
    #[serde(default)]
    pub service_areas: Vec<String>,
    #[serde(default)]
    pub payment_modes: Vec<String>,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub is_enabled: bool,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
}

/// Order as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOrder {
    pub id: i64,
    pub order_id: String,
    pub user_id: String,
    pub distributor_id: String,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub total_amount: Option<Decimal>,
    pub status: OrderStatus,
    pub payment_mode: Option<String>,
    pub delivery_address: Option<String>,
    pub created_at: Option<String>,
}

/// Stock record as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStock {
    pub id: i64,
    pub user_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub distributor_name: Option<String>,
    pub last_updated: Option<String>,
}

/// Body of `POST /api/inventory/add`
#[derive(Debug, Clone, Serialize)]
pub struct AddProductPayload {
    pub distributor_id: String,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub moq: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_time: Option<String>,
    pub service_areas: Vec<String>,
    pub payment_modes: Vec<String>,
    pub stock_quantity: u32,
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `PUT /api/inventory/{id}`; absent fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moq: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_modes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `POST /api/orders/create`
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderPayload {
    pub user_id: String,
    pub distributor_id: String,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub payment_mode: String,
    pub delivery_address: String,
}

#[derive(Debug, Serialize)]
struct UpdateStockPayload {
    quantity: u32,
}

/// Filters for `GET /api/inventory`
#[derive(Debug, Clone, Default)]
pub struct InventoryQuery {
    pub distributor_id: Option<String>,
    pub enabled_only: bool,
}

/// Filters for `GET /api/orders`
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub distributor_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

impl From<ApiProduct> for InventoryProduct {
    fn from(p: ApiProduct) -> Self {
        InventoryProduct {
            id: p.id,
            distributor_name: p.distributor_id.clone(),
            distributor_id: p.distributor_id,
            distributor_phone: None,
            product_name: p.product_name,
            description: None,
            category: p.category,
            unit_price: p.price,
            quantity: p.stock_quantity,
            moq: p.moq,
            lead_time: p.lead_time,
            service_areas: p.service_areas.into_iter().collect::<BTreeSet<_>>(),
            payment_modes: p.payment_modes.into_iter().collect::<BTreeSet<_>>(),
            seller_note: None,
            image_url: p.image_url,
            show_in_offers: p.is_enabled,
            created_at: parse_timestamp(p.created_at.as_deref()),
        }
    }
}

impl From<ApiOrder> for Order {
    fn from(o: ApiOrder) -> Self {
        let created_at = parse_timestamp(o.created_at.as_deref());
        let total_price = calculate_order_total(o.quantity, o.price);
        if let Some(total_amount) = o.total_amount.filter(|t| *t != total_price) {
            tracing::warn!(
                order_id = %o.order_id,
                %total_amount,
                %total_price,
                "Backend total disagrees with quantity x price, using the computed total"
            );
        }
        Order {
            id: o.id,
            order_ref: Some(o.order_id),
            orderer_name: o.user_id.clone(),
            orderer_type: OrdererType::User,
            user_id: Some(o.user_id),
            product_id: Some(o.product_id),
            product_name: o.product_name,
            quantity: o.quantity,
            price_per_unit: o.price,
            total_price,
            distributor_name: o.distributor_id.clone(),
            distributor_id: o.distributor_id,
            distributor_phone: None,
            payment_mode: o.payment_mode,
            delivery_address: o.delivery_address,
            status: o.status,
            created_at,
            updated_at: created_at,
        }
    }
}

impl From<ApiStock> for UserStock {
    fn from(s: ApiStock) -> Self {
        UserStock {
            id: s.id,
            product_name: s.product_name,
            category: s.category,
            quantity: s.quantity,
            distributor_name: s.distributor_name.unwrap_or_default(),
            received_date: parse_timestamp(s.last_updated.as_deref()),
            order_id: None,
        }
    }
}

impl BackendClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client around an existing `reqwest::Client`
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------------

    pub async fn add_product(&self, payload: &AddProductPayload) -> AppResult<ApiProduct> {
        let request = self.request(Method::POST, "/api/inventory/add").json(payload);
        self.send(request, "Failed to add product").await
    }

    pub async fn get_inventory(&self, query: &InventoryQuery) -> AppResult<Vec<ApiProduct>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(distributor_id) = &query.distributor_id {
            params.push(("distributor_id", distributor_id.clone()));
        }
        if query.enabled_only {
            params.push(("enabled_only", "true".to_string()));
        }
        let request = self.request(Method::GET, "/api/inventory").query(&params);
        self.send(request, "Failed to fetch inventory").await
    }

    pub async fn update_product(
        &self,
        product_id: i64,
        payload: &UpdateProductPayload,
    ) -> AppResult<ApiProduct> {
        let path = format!("/api/inventory/{}", product_id);
        let request = self.request(Method::PUT, &path).json(payload);
        self.send(request, "Failed to update product").await
    }

    pub async fn delete_product(&self, product_id: i64) -> AppResult<()> {
        let path = format!("/api/inventory/{}", product_id);
        let response = self.request(Method::DELETE, &path).send().await?;
        Self::check_status(response, "Failed to delete product").await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------------

    pub async fn create_order(&self, payload: &CreateOrderPayload) -> AppResult<ApiOrder> {
        let request = self.request(Method::POST, "/api/orders/create").json(payload);
        self.send(request, "Failed to create order").await
    }

    pub async fn get_orders(&self, query: &OrderQuery) -> AppResult<Vec<ApiOrder>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(distributor_id) = &query.distributor_id {
            params.push(("distributor_id", distributor_id.clone()));
        }
        if let Some(user_id) = &query.user_id {
            params.push(("user_id", user_id.clone()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_wire_str().to_string()));
        }
        let request = self.request(Method::GET, "/api/orders").query(&params);
        self.send(request, "Failed to fetch orders").await
    }

    pub async fn accept_order(&self, order_ref: &str) -> AppResult<ApiOrder> {
        self.order_action(order_ref, "accept").await
    }

    pub async fn dispatch_order(&self, order_ref: &str) -> AppResult<ApiOrder> {
        self.order_action(order_ref, "dispatch").await
    }

    /// The backend reduces inventory and credits the buyer's stock itself
    pub async fn deliver_order(&self, order_ref: &str) -> AppResult<ApiOrder> {
        self.order_action(order_ref, "deliver").await
    }

    async fn order_action(&self, order_ref: &str, action: &str) -> AppResult<ApiOrder> {
        let path = format!("/api/orders/{}/{}", order_ref, action);
        let request = self.request(Method::PUT, &path);
        self.send(request, &format!("Failed to {} order", action)).await
    }

    // ------------------------------------------------------------------------
    // Stock
    // ------------------------------------------------------------------------

    pub async fn get_user_stock(&self, user_id: &str) -> AppResult<Vec<ApiStock>> {
        let request = self
            .request(Method::GET, "/api/stock")
            .query(&[("user_id", user_id)]);
        self.send(request, "Failed to fetch stock").await
    }

    pub async fn update_stock(&self, stock_id: i64, quantity: u32) -> AppResult<ApiStock> {
        let path = format!("/api/stock/{}", stock_id);
        let request = self
            .request(Method::PUT, &path)
            .json(&UpdateStockPayload { quantity });
        self.send(request, "Failed to update stock").await
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Backend request");
        self.client.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, fallback: &str) -> AppResult<T> {
        let response = request.send().await?;
        let response = Self::check_status(response, fallback).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Turn a non-2xx response into [`AppError::Api`], preferring the
    /// backend's own `detail` or `message`
    async fn check_status(response: reqwest::Response, fallback: &str) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| fallback.to_string());
        tracing::warn!(status = status.as_u16(), %message, "Backend request failed");

        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Parse a backend timestamp, with or without a UTC offset
///
/// Missing or unreadable values fall back to the current time.
fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    let Some(value) = value else {
        return Utc::now();
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Utc);
    }
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.and_utc(),
        Err(_) => {
            tracing::debug!(value, "Unreadable backend timestamp");
            Utc::now()
        }
    }
}

/// Extract a human-readable message from a backend error body
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Some(serde_json::Value::String(detail)) => return Some(detail),
        // FastAPI validation errors arrive as a list of objects
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }
    parsed.message
}
