//! API server configuration.
//!
//! Values come from the server's command line (with environment fallbacks);
//! tests build one with `ApiConfig::new`.

use labelhub_core::auth::TokenLifetimes;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8010";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8010").
    pub bind_addr: String,
    /// SQLite connection URL.
    pub database_url: String,
    /// Mark auth cookies `Secure` (serve over HTTPS only).
    pub secure_cookies: bool,
    /// Lifetimes of newly issued token pairs.
    pub token_lifetimes: TokenLifetimes,
}

impl ApiConfig {
    /// Configuration for `database_url` with all other settings defaulted.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            database_url: database_url.into(),
            secure_cookies: false,
            token_lifetimes: TokenLifetimes::default(),
        }
    }
}
