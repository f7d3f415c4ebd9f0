//! Store connection configuration
//!
//! # Example
//! ```
//! use strictkv::StoreConfig;
//!
//! let config = StoreConfig::new("10.0.0.5:6379")
//!     .password("s3cret")
//!     .db(2)
//!     .pool_size(4);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.url(), "redis://:s3cret@10.0.0.5:6379/2");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};

/// Connection settings for a Redis-compatible store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Server address (host:port)
    pub addr: String,
    /// Password; empty means no AUTH
    pub password: String,
    /// Logical database index
    pub db: i64,
    /// Maximum pooled connections
    pub pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            password: String::new(),
            db: 0,
            pool_size: 10,
        }
    }
}

impl StoreConfig {
    /// Create a config for the given address
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `STRICTKV_ADDR` (default `127.0.0.1:6379`)
    /// - `STRICTKV_PASSWORD` (default empty)
    /// - `STRICTKV_DB` (default `0`)
    /// - `STRICTKV_POOL_SIZE` (default `10`)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let addr = std::env::var("STRICTKV_ADDR").unwrap_or(defaults.addr);
        let password = std::env::var("STRICTKV_PASSWORD").unwrap_or(defaults.password);
        let db = match std::env::var("STRICTKV_DB") {
            Ok(raw) => raw.parse().map_err(|_| {
                KvError::Configuration(format!("STRICTKV_DB is not an integer: '{}'", raw))
            })?,
            Err(_) => defaults.db,
        };
        let pool_size = match std::env::var("STRICTKV_POOL_SIZE") {
            Ok(raw) => raw.parse().map_err(|_| {
                KvError::Configuration(format!("STRICTKV_POOL_SIZE is not a number: '{}'", raw))
            })?,
            Err(_) => defaults.pool_size,
        };

        let config = Self {
            addr,
            password,
            db,
            pool_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set logical database index
    pub fn db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Set maximum pool size
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Reject settings no store could be reached with
    pub fn validate(&self) -> Result<()> {
        if self.addr.is_empty() {
            return Err(KvError::Configuration("missing store address".to_string()));
        }
        if self.db < 0 {
            return Err(KvError::Configuration(format!(
                "number of db less 0: <{}>",
                self.db
            )));
        }
        if self.pool_size == 0 {
            return Err(KvError::Configuration("pool size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Connection URL, e.g. `redis://:password@host:port/db`
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}/{}", self.addr, self.db)
        } else {
            format!(
                "redis://:{}@{}/{}",
                urlencoding::encode(&self.password),
                self.addr,
                self.db
            )
        }
    }
}
