//! Domain models for the rural storefront

mod inventory;
mod order;
mod stock;

pub use inventory::*;
pub use order::*;
pub use stock::*;
