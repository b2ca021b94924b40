//! Shared types and models for the rural storefront
//!
//! This crate contains the order, inventory and stock models shared between
//! the storefront services, the backend client and the mobile front end
//! (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
