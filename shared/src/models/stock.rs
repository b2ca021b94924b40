//! Received-stock records held by SHGs, pharmacists and users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock a user has received from a distributor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserStock {
    pub id: i64,
    pub product_name: String,
    pub category: Option<String>,
    pub quantity: u32,
    pub distributor_name: String,
    pub received_date: DateTime<Utc>,
    /// Order whose delivery created this record
    pub order_id: Option<i64>,
}

impl UserStock {
    /// Records merge when they share product and distributor
    pub fn matches(&self, product_name: &str, distributor_name: &str) -> bool {
        self.product_name == product_name && self.distributor_name == distributor_name
    }
}
