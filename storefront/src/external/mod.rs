//! External API integrations

pub mod backend;

pub use backend::BackendClient;
