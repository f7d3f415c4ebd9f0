//! List operations
//!
//! A list key is either absent or holds at least one element: the store drops
//! a list when its last element is removed, so popping a one-element list
//! makes the next pop fail with `KeyNotFound`.
//!
//! Values passed to [`create_list`](Facade::create_list) and
//! [`push_left`](Facade::push_left) are pushed one by one onto the head, so
//! the **last** value given ends up first.

use tracing::{debug, error, warn};

use super::Facade;
use crate::error::{KvError, Result};
use crate::precondition::{self, Precondition};
use crate::store::Store;

impl<S: Store> Facade<S> {
    /// Create a list that must not exist yet from a non-empty sequence.
    ///
    /// Returns the length of the new list.
    pub async fn create_list<V: AsRef<str>>(&self, key: &str, values: &[V]) -> Result<u64> {
        const OP: &str = "create_list";
        precondition::key(OP, key)?;
        precondition::values(OP, values)?;
        self.require(OP, key, Precondition::Absent).await?;

        let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
        debug!(key, count = values.len(), "Creating list");
        let len = self
            .store
            .lpush(key, &values)
            .await
            .map_err(|e| KvError::store(OP, key, e))?;

        if len != values.len() as u64 {
            warn!(key, len, "List was created concurrently; values were prepended to it");
        }
        Ok(len)
    }

    /// Push values onto the head of an existing list, returning its new length
    pub async fn push_left<V: AsRef<str>>(&self, key: &str, values: &[V]) -> Result<u64> {
        const OP: &str = "push_left";
        precondition::key(OP, key)?;
        precondition::values(OP, values)?;
        self.require(OP, key, Precondition::Present).await?;

        let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
        debug!(key, count = values.len(), "Pushing to list head");
        self.store
            .lpush(key, &values)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Push values onto the tail of an existing list, returning its new length
    pub async fn push_right<V: AsRef<str>>(&self, key: &str, values: &[V]) -> Result<u64> {
        const OP: &str = "push_right";
        precondition::key(OP, key)?;
        precondition::values(OP, values)?;
        self.require(OP, key, Precondition::Present).await?;

        let values: Vec<&str> = values.iter().map(|v| v.as_ref()).collect();
        debug!(key, count = values.len(), "Pushing to list tail");
        self.store
            .rpush(key, &values)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Remove and return the head element
    pub async fn pop_left(&self, key: &str) -> Result<String> {
        const OP: &str = "pop_left";
        precondition::key(OP, key)?;
        self.require(OP, key, Precondition::Present).await?;

        let popped = self
            .store
            .lpop(key)
            .await
            .map_err(|e| KvError::store(OP, key, e))?;
        popped.ok_or_else(|| {
            warn!(key, "List vanished between probe and pop");
            KvError::not_found(OP, key)
        })
    }

    /// Remove and return the tail element
    pub async fn pop_right(&self, key: &str) -> Result<String> {
        const OP: &str = "pop_right";
        precondition::key(OP, key)?;
        self.require(OP, key, Precondition::Present).await?;

        let popped = self
            .store
            .rpop(key)
            .await
            .map_err(|e| KvError::store(OP, key, e))?;
        popped.ok_or_else(|| {
            warn!(key, "List vanished between probe and pop");
            KvError::not_found(OP, key)
        })
    }

    /// Number of elements in an existing list
    pub async fn list_len(&self, key: &str) -> Result<u64> {
        const OP: &str = "list_len";
        precondition::key(OP, key)?;
        self.require(OP, key, Precondition::Present).await?;

        self.store
            .llen(key)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Elements `start..=stop`, in stored order.
    ///
    /// Requires `0 <= start < stop` and `stop` inside the current list;
    /// anything else is an index error.
    pub async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        const OP: &str = "list_range";
        precondition::key(OP, key)?;
        precondition::range(OP, key, start, stop)?;
        self.checked_bounds(OP, key, stop).await?;

        debug!(key, start, stop, "Reading list range");
        self.store
            .lrange(key, start, stop)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Keep only elements `start..=stop`, returning the store's status token.
    ///
    /// Bounds are checked as for [`list_range`](Self::list_range).
    pub async fn trim_list(&self, key: &str, start: i64, stop: i64) -> Result<String> {
        const OP: &str = "trim_list";
        precondition::key(OP, key)?;
        precondition::range(OP, key, start, stop)?;
        self.checked_bounds(OP, key, stop).await?;

        debug!(key, start, stop, "Trimming list");
        self.store
            .ltrim(key, start, stop)
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Move one occurrence of `value` from `src` to the head of a new list
    /// `dest`.
    ///
    /// `src` must exist and `dest` must not. Returns the number of elements
    /// moved. The removal and the push are separate round-trips: if the push
    /// fails after the removal succeeded, the value is lost from both lists
    /// and the push error is returned.
    pub async fn move_to_new_list(&self, src: &str, dest: &str, value: &str) -> Result<u64> {
        const OP: &str = "move_to_new_list";
        precondition::key(OP, src)?;
        precondition::key(OP, dest)?;
        precondition::value(OP, value)?;
        self.require(OP, src, Precondition::Present).await?;
        self.require(OP, dest, Precondition::Absent).await?;

        let removed = self
            .store
            .lrem(src, 1, value)
            .await
            .map_err(|e| KvError::store(OP, src, e))?;
        if removed == 0 {
            return Err(KvError::ValueNotFound {
                op: OP,
                key: src.to_string(),
                value: value.to_string(),
            });
        }

        debug!(src, dest, "Moving list value");
        if let Err(e) = self.store.lpush(dest, &[value]).await {
            error!(src, dest, error = %e, "Value removed from source but not pushed to destination");
            return Err(KvError::store(OP, dest, e));
        }
        Ok(removed)
    }

    /// Probe the list, then check `stop` against its current length
    async fn checked_bounds(&self, op: &'static str, key: &str, stop: i64) -> Result<()> {
        self.require(op, key, Precondition::Present).await?;

        let len = self
            .store
            .llen(key)
            .await
            .map_err(|e| KvError::store(op, key, e))?;
        precondition::within(op, key, stop, len)
    }
}
