//! Typed facade over a [`Store`]
//!
//! The facade owns no data. Each operation validates its arguments, checks the
//! existence precondition its semantics require, then issues the mutation.
//!
//! # Consistency
//!
//! Where the store has an atomic conditional primitive (create-if-absent,
//! update-if-present) the facade relies on its result. Elsewhere (read and
//! replace, arithmetic, list operations, moving a value between lists) the
//! existence probe and the mutation are separate round-trips and are **not**
//! linearizable: a concurrent client may create or delete the key in between.
//! No rollback is attempted.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use strictkv::{Facade, MemoryStore};
//!
//! # async fn example() -> strictkv::Result<()> {
//! let kv = Facade::new(MemoryStore::new());
//! kv.create_string_ttl("greeting", "hello", Duration::from_secs(60)).await?;
//! assert_eq!(kv.get_string("greeting").await?, "hello");
//! # Ok(())
//! # }
//! ```

mod json;
mod list;
mod numeric;
mod strings;

use tracing::debug;

use crate::error::{KvError, Result};
use crate::precondition::{self, Precondition};
use crate::store::Store;

#[cfg(feature = "redis")]
use crate::config::StoreConfig;
#[cfg(feature = "redis")]
use crate::store::RedisStore;

/// Expected handshake reply
const PONG: &str = "PONG";

/// Operations handle over a store
///
/// Share across tasks with `Arc<Facade<S>>`; the facade adds no locking of
/// its own.
pub struct Facade<S: Store> {
    store: S,
}

#[cfg(feature = "redis")]
impl Facade<RedisStore> {
    /// Build a facade over a Redis server.
    ///
    /// Fails with a configuration error for an empty address or a negative
    /// database index. No connection is opened until the first operation.
    pub fn connect(addr: &str, password: &str, db: i64) -> Result<Self> {
        let config = StoreConfig::new(addr).password(password).db(db);
        Self::from_config(&config)
    }

    /// Build a facade over a Redis server from full configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(RedisStore::new(config)?))
    }
}

impl<S: Store> Facade<S> {
    /// Wrap an existing store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap into the underlying store
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Health check; fails unless the store answers `PONG`
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .store
            .ping()
            .await
            .map_err(|e| KvError::store("ping", "", e))?;
        if response != PONG {
            return Err(KvError::Handshake { response });
        }
        Ok(())
    }

    /// Release the store's connections
    pub async fn close(&self) -> Result<()> {
        self.store
            .close()
            .await
            .map_err(|e| KvError::store("close", "", e))
    }

    /// Number of the given key present in the store (1 or 0)
    pub async fn exists(&self, key: &str) -> Result<u64> {
        const OP: &str = "exists";
        precondition::key(OP, key)?;

        self.store
            .exists(&[key])
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Probe whether `key` currently exists
    async fn probe(&self, op: &'static str, key: &str) -> Result<bool> {
        let count = self
            .store
            .exists(&[key])
            .await
            .map_err(|e| KvError::store(op, key, e))?;
        debug!(op, key, present = count > 0, "Probed key");
        Ok(count > 0)
    }

    /// Probe `key` and check it against `pre`
    async fn require(&self, op: &'static str, key: &str, pre: Precondition) -> Result<()> {
        let present = self.probe(op, key).await?;
        pre.check(op, key, present)
    }
}
