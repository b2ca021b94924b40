//! Rural storefront core
//!
//! Order lifecycle, distributor inventory and user stock for a storefront
//! connecting health-product distributors with self-help groups,
//! pharmacists and end users. [`services`] holds the in-memory stores,
//! [`sync`] the backend-backed cache and [`external`] the REST client.

pub mod config;
pub mod error;
pub mod external;
pub mod services;
pub mod settings;
pub mod sync;

pub use config::Config;
pub use error::{AppError, AppResult};
