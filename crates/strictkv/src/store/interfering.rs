//! Test store that simulates a concurrent client
//!
//! Wraps a [`MemoryStore`]. With `vanish` set, every key reported as
//! existing is deleted right after the existence check, as if another client
//! removed it between the facade's probe and its write. With `fail_push`
//! set, list pushes fail with a connection error.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{MemoryStore, Store};
use crate::error::StoreError;
use crate::types::Slot;

#[derive(Default)]
pub(crate) struct Interfering {
    inner: MemoryStore,
    vanish: AtomicBool,
    fail_push: AtomicBool,
}

impl Interfering {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub(crate) fn vanish_after_probe(&self, on: bool) {
        self.vanish.store(on, Ordering::SeqCst);
    }

    pub(crate) fn fail_pushes(&self, on: bool) {
        self.fail_push.store(on, Ordering::SeqCst);
    }

    fn push_allowed(&self) -> Result<(), StoreError> {
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for Interfering {
    async fn ping(&self) -> Result<String, StoreError> {
        self.inner.ping().await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.inner.close().await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_nx(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        self.inner.set_nx(key, value, ttl).await
    }

    async fn set_xx(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        self.inner.set_xx(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn get_set(&self, key: &str, value: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_set(key, value).await
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Slot>, StoreError> {
        self.inner.mget(keys).await
    }

    async fn mset(&self, pairs: &[(&str, &str)]) -> Result<String, StoreError> {
        self.inner.mset(pairs).await
    }

    async fn del(&self, keys: &[&str]) -> Result<u64, StoreError> {
        self.inner.del(keys).await
    }

    async fn exists(&self, keys: &[&str]) -> Result<u64, StoreError> {
        let count = self.inner.exists(keys).await?;
        if count > 0 && self.vanish.load(Ordering::SeqCst) {
            self.inner.del(keys).await?;
        }
        Ok(count)
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.inner.incr_by(key, delta).await
    }

    async fn decr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.inner.decr_by(key, delta).await
    }

    async fn incr_by_float(&self, key: &str, delta: f64) -> Result<f64, StoreError> {
        self.inner.incr_by_float(key, delta).await
    }

    async fn lpush(&self, key: &str, values: &[&str]) -> Result<u64, StoreError> {
        self.push_allowed()?;
        self.inner.lpush(key, values).await
    }

    async fn rpush(&self, key: &str, values: &[&str]) -> Result<u64, StoreError> {
        self.push_allowed()?;
        self.inner.rpush(key, values).await
    }

    async fn lpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.lpop(key).await
    }

    async fn rpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.rpop(key).await
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        self.inner.llen(key).await
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        self.inner.lrange(key, start, stop).await
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<String, StoreError> {
        self.inner.ltrim(key, start, stop).await
    }

    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<u64, StoreError> {
        self.inner.lrem(key, count, value).await
    }
}
