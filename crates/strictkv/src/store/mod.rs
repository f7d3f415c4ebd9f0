//! Store collaborator
//!
//! The facade never talks to a server directly. It drives a [`Store`], which
//! exposes the low-level key-value and list primitives of a Redis-compatible
//! server. Implementations report failures as [`StoreError`] and leave all
//! precondition logic to the facade.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;
use crate::types::Slot;

/// Low-level key-value and list primitives
///
/// Semantics follow the Redis commands of the same name: conditional writes
/// report whether they happened, deletes and existence checks report counts,
/// arithmetic acts on the decimal text form of a string value, and a list key
/// disappears once its last element is removed.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Handshake; a healthy store answers `PONG`
    async fn ping(&self) -> Result<String, StoreError>;

    /// Release connections. Later calls fail with [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError>;

    /// Unconditional write
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Write only if the key is absent. Returns whether the write happened.
    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> Result<bool, StoreError>;

    /// Write only if the key is present. Returns whether the write happened.
    async fn set_xx(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write and return the previous value. Clears any TTL on the key.
    async fn get_set(&self, key: &str, value: &str) -> Result<Option<String>, StoreError>;

    /// Batched read, one slot per key in input order
    async fn mget(&self, keys: &[&str]) -> Result<Vec<Slot>, StoreError>;

    /// Batched unconditional write without TTL, returning the status reply
    async fn mset(&self, pairs: &[(&str, &str)]) -> Result<String, StoreError>;

    /// Remove keys, returning how many existed
    async fn del(&self, keys: &[&str]) -> Result<u64, StoreError>;

    /// Count how many of the keys exist
    async fn exists(&self, keys: &[&str]) -> Result<u64, StoreError>;

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        self.incr_by(key, 1).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    async fn decr(&self, key: &str) -> Result<i64, StoreError> {
        self.decr_by(key, 1).await
    }

    async fn decr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    async fn incr_by_float(&self, key: &str, delta: f64) -> Result<f64, StoreError>;

    /// Push each value onto the head in order; returns the new length
    async fn lpush(&self, key: &str, values: &[&str]) -> Result<u64, StoreError>;

    /// Push each value onto the tail in order; returns the new length
    async fn rpush(&self, key: &str, values: &[&str]) -> Result<u64, StoreError>;

    async fn lpop(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn rpop(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn llen(&self, key: &str) -> Result<u64, StoreError>;

    /// Inclusive range; negative indices count from the tail
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;

    /// Keep only the inclusive range; returns the status token
    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<String, StoreError>;

    /// Remove up to `|count|` occurrences of `value`, from the head when
    /// `count > 0`, from the tail when `count < 0`, all when `count == 0`
    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<u64, StoreError>;
}

pub mod memory;

#[cfg(test)]
pub(crate) mod interfering;

#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryStore;

#[cfg(feature = "redis")]
pub use self::redis::RedisStore;
