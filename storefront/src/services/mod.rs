//! Business logic services for the rural storefront

pub mod fulfillment;
pub mod inventory;
pub mod orders;
pub mod stock;

pub use fulfillment::{Delivery, PlaceOrderRequest, Storefront};
pub use inventory::{InventoryService, NewProduct, ProductUpdate};
pub use orders::{NewOrder, OrderDetailsUpdate, OrderService};
pub use stock::{NewStockEntry, StockLedger, StockUpdate};
