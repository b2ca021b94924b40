//! Order models and the order status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An order placed by an SHG, pharmacist or user against a distributor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    /// Backend order reference (e.g. "ORD-1700000000"), used in action URLs
    pub order_ref: Option<String>,
    pub orderer_name: String,
    pub orderer_type: OrdererType,
    pub user_id: Option<String>,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: u32,
    pub price_per_unit: Decimal,
    /// Always `quantity * price_per_unit`
    pub total_price: Decimal,
    pub distributor_id: String,
    pub distributor_name: String,
    pub distributor_phone: Option<String>,
    pub payment_mode: Option<String>,
    pub delivery_address: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Recompute the derived total after quantity or price changed
    pub fn recalculate_total(&mut self) {
        self.total_price = calculate_order_total(self.quantity, self.price_per_unit);
    }
}

/// Who placed the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrdererType {
    Shg,
    Pharmacist,
    Distributor,
    #[default]
    User,
}

impl std::fmt::Display for OrdererType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrdererType::Shg => write!(f, "SHG"),
            OrdererType::Pharmacist => write!(f, "Pharmacist"),
            OrdererType::Distributor => write!(f, "Distributor"),
            OrdererType::User => write!(f, "User"),
        }
    }
}

/// Lifecycle status of an order
///
/// ```text
/// placed ──▶ accepted ──▶ dispatched ──▶ delivered
///   │
///   └──▶ rejected
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// The backend calls this state "pending"
    #[serde(alias = "pending")]
    Placed,
    Accepted,
    Dispatched,
    Delivered,
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::Accepted,
        OrderStatus::Dispatched,
        OrderStatus::Delivered,
        OrderStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Rejected => "rejected",
        }
    }

    /// Name used by the REST backend in query strings
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "pending",
            other => other.as_str(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Rejected)
    }

    /// The next status on the happy path, if any
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Placed => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::Dispatched),
            OrderStatus::Dispatched => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Rejected => None,
        }
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        matches!(
            (self, to),
            (OrderStatus::Placed, OrderStatus::Accepted)
                | (OrderStatus::Placed, OrderStatus::Rejected)
                | (OrderStatus::Accepted, OrderStatus::Dispatched)
                | (OrderStatus::Dispatched, OrderStatus::Delivered)
        )
    }

    /// Validate a transition, returning the new status
    pub fn transition(self, to: OrderStatus) -> Result<OrderStatus, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError { from: self, to })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placed" | "pending" => Ok(OrderStatus::Placed),
            "accepted" => Ok(OrderStatus::Accepted),
            "dispatched" => Ok(OrderStatus::Dispatched),
            "delivered" => Ok(OrderStatus::Delivered),
            "rejected" => Ok(OrderStatus::Rejected),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Rejected order status change
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Calculate an order total (`quantity * unit price`)
pub fn calculate_order_total(quantity: u32, price_per_unit: Decimal) -> Decimal {
    Decimal::from(quantity) * price_per_unit
}
