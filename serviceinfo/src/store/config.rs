//! Store connection configuration.

/// Default Redis URL: local server, database 0.
pub const DEFAULT_URL: &str = "redis://127.0.0.1:6379/0";

/// Configuration for the Redis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Redis connection URL (`redis://host:port/db`)
    pub url: String,
}

impl StoreConfig {
    /// Create a config for the given connection URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Create a config from host, port and database number.
    pub fn from_parts(host: &str, port: u16, database: u32) -> Self {
        Self::new(format!("redis://{host}:{port}/{database}"))
    }

    /// Set a different connection URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}
