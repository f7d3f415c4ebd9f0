//! Integer and float operations
//!
//! Numbers are stored as their decimal text. Arithmetic requires the key to
//! exist: an absent counter is `KeyNotFound`, never created implicitly. A
//! stored value that is not a number surfaces as a store error wrapping
//! [`StoreError::NotANumber`](crate::StoreError::NotANumber).

use std::time::Duration;
use tracing::debug;

use super::Facade;
use crate::error::{KvError, Result, StoreError};
use crate::precondition::{self, Precondition};
use crate::store::Store;

impl<S: Store> Facade<S> {
    /// Create an integer that must not exist yet
    pub async fn create_int_ttl(&self, key: &str, value: i64, ttl: Duration) -> Result<()> {
        const OP: &str = "create_int_ttl";
        precondition::key(OP, key)?;
        precondition::ttl(OP, ttl)?;

        self.create_text(OP, key, &value.to_string(), ttl).await
    }

    /// Add one to an existing integer, returning the new value
    pub async fn increment(&self, key: &str) -> Result<i64> {
        const OP: &str = "increment";
        precondition::key(OP, key)?;
        self.require(OP, key, Precondition::Present).await?;

        debug!(key, "Incrementing");
        self.store
            .incr(key)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Add `delta` to an existing integer, returning the new value
    pub async fn add_int(&self, key: &str, delta: i64) -> Result<i64> {
        const OP: &str = "add_int";
        precondition::key(OP, key)?;
        self.require(OP, key, Precondition::Present).await?;

        debug!(key, delta, "Adding to integer");
        self.store
            .incr_by(key, delta)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Subtract one from an existing integer, returning the new value
    pub async fn decrement(&self, key: &str) -> Result<i64> {
        const OP: &str = "decrement";
        precondition::key(OP, key)?;
        self.require(OP, key, Precondition::Present).await?;

        debug!(key, "Decrementing");
        self.store
            .decr(key)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Subtract `delta` from an existing integer, returning the new value
    pub async fn sub_int(&self, key: &str, delta: i64) -> Result<i64> {
        const OP: &str = "sub_int";
        precondition::key(OP, key)?;
        self.require(OP, key, Precondition::Present).await?;

        debug!(key, delta, "Subtracting from integer");
        self.store
            .decr_by(key, delta)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Read an integer
    pub async fn get_int(&self, key: &str) -> Result<i64> {
        const OP: &str = "get_int";
        precondition::key(OP, key)?;

        let text = self.read_text(OP, key).await?;
        text.parse()
            .map_err(|_| KvError::store(OP, key, StoreError::NotANumber))
    }

    /// Create a float that must not exist yet
    pub async fn create_float_ttl(&self, key: &str, value: f64, ttl: Duration) -> Result<()> {
        const OP: &str = "create_float_ttl";
        precondition::key(OP, key)?;
        precondition::finite(OP, value)?;
        precondition::ttl(OP, ttl)?;

        self.create_text(OP, key, &value.to_string(), ttl).await
    }

    /// Add `delta` to an existing float, returning the new value
    pub async fn add_float(&self, key: &str, delta: f64) -> Result<f64> {
        const OP: &str = "add_float";
        precondition::key(OP, key)?;
        precondition::finite(OP, delta)?;
        self.require(OP, key, Precondition::Present).await?;

        debug!(key, delta, "Adding to float");
        self.store
            .incr_by_float(key, delta)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Read a float
    pub async fn get_float(&self, key: &str) -> Result<f64> {
        const OP: &str = "get_float";
        precondition::key(OP, key)?;

        let text = self.read_text(OP, key).await?;
        text.parse()
            .map_err(|_| KvError::store(OP, key, StoreError::NotANumber))
    }
}
