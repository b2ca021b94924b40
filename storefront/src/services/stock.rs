//! Stock ledger for goods a user has received

use chrono::Utc;
use serde::Deserialize;
use shared::{validate_local_sale, validate_stock_edit, UserStock};

use crate::error::{AppError, AppResult};

/// One user's received stock, one record per product and distributor
#[derive(Debug, Default)]
pub struct StockLedger {
    /// Newest first
    stocks: Vec<UserStock>,
    last_id: i64,
}

/// Stock arriving from a delivery
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStockEntry {
    pub product_name: String,
    pub category: Option<String>,
    pub quantity: u32,
    pub distributor_name: String,
    pub order_id: Option<i64>,
}

/// Manual edit of a stock record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockUpdate {
    pub quantity: Option<u32>,
    pub category: Option<String>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add received stock, merging into an existing record for the same
    /// product and distributor
    pub fn add_to_user_stock(&mut self, entry: NewStockEntry) -> UserStock {
        let now = Utc::now();

        if let Some(existing) = self
            .stocks
            .iter_mut()
            .find(|s| s.matches(&entry.product_name, &entry.distributor_name))
        {
            existing.quantity = existing.quantity.saturating_add(entry.quantity);
            existing.received_date = now;
            tracing::info!(
                stock_id = existing.id,
                product = %existing.product_name,
                added = entry.quantity,
                quantity = existing.quantity,
                "Stock merged"
            );
            return existing.clone();
        }

        self.last_id += 1;
        let stock = UserStock {
            id: self.last_id,
            product_name: entry.product_name,
            category: entry.category,
            quantity: entry.quantity,
            distributor_name: entry.distributor_name,
            received_date: now,
            order_id: entry.order_id,
        };
        tracing::info!(
            stock_id = stock.id,
            product = %stock.product_name,
            quantity = stock.quantity,
            "Stock received"
        );
        self.stocks.insert(0, stock.clone());
        stock
    }

    /// Apply a manual edit; quantity may only go down
    pub fn update_user_stock(&mut self, stock_id: i64, update: StockUpdate) -> AppResult<UserStock> {
        let stock = self.find_mut(stock_id)?;

        if let Some(quantity) = update.quantity {
            validate_stock_edit(stock.quantity, quantity)
                .map_err(|msg| AppError::validation("quantity", msg))?;
        }

        if let Some(quantity) = update.quantity {
            stock.quantity = quantity;
        }
        if let Some(category) = update.category {
            stock.category = Some(category);
        }

        tracing::info!(stock_id, quantity = stock.quantity, "Stock updated");
        Ok(stock.clone())
    }

    /// Sell from stock to a local customer
    pub fn record_local_sale(&mut self, stock_id: i64, quantity: u32) -> AppResult<UserStock> {
        let stock = self.find_mut(stock_id)?;
        validate_local_sale(stock.quantity, quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        stock.quantity -= quantity;

        tracing::info!(stock_id, sold = quantity, remaining = stock.quantity, "Local sale recorded");
        Ok(stock.clone())
    }

    pub fn get_stock(&self, stock_id: i64) -> AppResult<&UserStock> {
        self.stocks
            .iter()
            .find(|s| s.id == stock_id)
            .ok_or_else(|| AppError::NotFound(format!("Stock {}", stock_id)))
    }

    pub fn get_user_stocks(&self) -> &[UserStock] {
        &self.stocks
    }

    /// Total units held across all records
    pub fn total_units(&self) -> u64 {
        self.stocks.iter().map(|s| u64::from(s.quantity)).sum()
    }

    fn find_mut(&mut self, stock_id: i64) -> AppResult<&mut UserStock> {
        self.stocks
            .iter_mut()
            .find(|s| s.id == stock_id)
            .ok_or_else(|| AppError::NotFound(format!("Stock {}", stock_id)))
    }
}
