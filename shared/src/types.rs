//! Common types used across the storefront

/// Backend address used until the user saves their own
pub const DEFAULT_API_URL: &str = "http://192.168.1.42:8000";
