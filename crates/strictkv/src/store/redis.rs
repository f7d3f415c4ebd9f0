//! Redis-backed store
//!
//! Provides the [`Store`] primitives over a deadpool-redis connection pool.
//! The pool connects lazily: building a `RedisStore` performs no network I/O,
//! the first command does.

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Connection, Pool, PoolError, Runtime};
use redis::{AsyncCommands, RedisError};
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::debug;

use super::Store;
use crate::config::StoreConfig;
use crate::error::{KvError, Result, StoreError};
use crate::types::Slot;

/// Classify a Redis error into the store taxonomy
fn classify(err: RedisError) -> StoreError {
    if err.code() == Some("WRONGTYPE") {
        return StoreError::WrongType;
    }
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        return StoreError::Connection(err.to_string());
    }
    let detail = err.detail().unwrap_or_default();
    if detail.contains("not an integer") || detail.contains("not a valid float") {
        return StoreError::NotANumber;
    }
    StoreError::Backend(err.to_string())
}

/// TTL in milliseconds, rounding sub-millisecond durations up
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Redis [`Store`] implementation
///
/// Cloning shares the underlying pool.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Build a store from validated configuration
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        debug!(
            addr = %config.addr,
            db = config.db,
            pool_size = config.pool_size,
            "Creating Redis store"
        );

        let pool = PoolConfig::from_url(config.url())
            .builder()
            .map_err(|e| KvError::Configuration(format!("Failed to create pool builder: {}", e)))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| KvError::Configuration(format!("Failed to create pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn conn(&self) -> std::result::Result<Connection, StoreError> {
        self.pool.get().await.map_err(|e| match e {
            PoolError::Closed => StoreError::Closed,
            PoolError::Backend(err) => classify(err),
            other => StoreError::Connection(format!("Failed to get connection: {}", other)),
        })
    }

    async fn conditional_set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        condition: &str,
    ) -> std::result::Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg(condition);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(classify)?;
        Ok(reply.is_some())
    }
}

type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
impl Store for RedisStore {
    async fn ping(&self) -> StoreResult<String> {
        let mut conn = self.conn().await?;
        redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }

    async fn close(&self) -> StoreResult<()> {
        debug!("Closing Redis pool");
        self.pool.close();
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        match ttl {
            Some(ttl) => conn
                .pset_ex::<_, _, ()>(key, value, ttl_millis(ttl))
                .await
                .map_err(classify),
            None => conn.set::<_, _, ()>(key, value).await.map_err(classify),
        }
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<bool> {
        self.conditional_set(key, value, ttl, "NX").await
    }

    async fn set_xx(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<bool> {
        self.conditional_set(key, value, ttl, "XX").await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get(key).await.map_err(classify)
    }

    async fn get_set(&self, key: &str, value: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.getset(key, value).await.map_err(classify)
    }

    async fn mget(&self, keys: &[&str]) -> StoreResult<Vec<Slot>> {
        let mut conn = self.conn().await?;
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(classify)?;
        if values.len() != keys.len() {
            return Err(StoreError::Backend(format!(
                "MGET returned {} slots for {} keys",
                values.len(),
                keys.len()
            )));
        }
        Ok(values.into_iter().map(Slot::from).collect())
    }

    async fn mset(&self, pairs: &[(&str, &str)]) -> StoreResult<String> {
        let mut conn = self.conn().await?;
        conn.mset(pairs).await.map_err(classify)
    }

    async fn del(&self, keys: &[&str]) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        conn.del(keys).await.map_err(classify)
    }

    async fn exists(&self, keys: &[&str]) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        redis::cmd("EXISTS")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn().await?;
        redis::cmd("INCR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut conn = self.conn().await?;
        conn.incr(key, delta).await.map_err(classify)
    }

    async fn decr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn().await?;
        redis::cmd("DECR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }

    async fn decr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut conn = self.conn().await?;
        conn.decr(key, delta).await.map_err(classify)
    }

    async fn incr_by_float(&self, key: &str, delta: f64) -> StoreResult<f64> {
        let mut conn = self.conn().await?;
        redis::cmd("INCRBYFLOAT")
            .arg(key)
            .arg(delta)
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }

    async fn lpush(&self, key: &str, values: &[&str]) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        conn.lpush(key, values).await.map_err(classify)
    }

    async fn rpush(&self, key: &str, values: &[&str]) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        conn.rpush(key, values).await.map_err(classify)
    }

    async fn lpop(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.lpop(key, None::<NonZeroUsize>).await.map_err(classify)
    }

    async fn rpop(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.rpop(key, None::<NonZeroUsize>).await.map_err(classify)
    }

    async fn llen(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        conn.llen(key).await.map_err(classify)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        let mut conn = self.conn().await?;
        redis::cmd("LRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> StoreResult<String> {
        let mut conn = self.conn().await?;
        redis::cmd("LTRIM")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }

    async fn lrem(&self, key: &str, count: i64, value: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        redis::cmd("LREM")
            .arg(key)
            .arg(count)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_rounds_up() {
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(ttl_millis(Duration::from_secs(2)), 2000);
    }

    #[test]
    fn test_classify_response_errors() {
        let err = RedisError::from((
            redis::ErrorKind::ResponseError,
            "An error was signalled by the server",
            "value is not an integer or out of range".to_string(),
        ));
        assert!(matches!(classify(err), StoreError::NotANumber));

        let err = RedisError::from((
            redis::ErrorKind::ResponseError,
            "An error was signalled by the server",
            "value is not a valid float".to_string(),
        ));
        assert!(matches!(classify(err), StoreError::NotANumber));

        let err = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(classify(err), StoreError::Connection(_)));
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(RedisStore::new(&StoreConfig::new("")).is_err());
        assert!(RedisStore::new(&StoreConfig::default().db(-1)).is_err());
    }

    #[tokio::test]
    async fn test_new_does_not_connect() {
        // Nothing listens on this port; construction must still succeed
        let store = RedisStore::new(&StoreConfig::new("127.0.0.1:1")).unwrap();
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_closed_pool() {
        let store = RedisStore::new(&StoreConfig::default()).unwrap();
        store.close().await.unwrap();
        assert!(matches!(store.get("k").await, Err(StoreError::Closed)));
    }

    // Integration tests - require Redis running on localhost:6379
    // Run: cargo test -p strictkv -- --ignored

    #[tokio::test]
    #[ignore]
    async fn test_ping() {
        let store = RedisStore::new(&StoreConfig::default()).unwrap();
        assert_eq!(store.ping().await.unwrap(), "PONG");
    }

    #[tokio::test]
    #[ignore]
    async fn test_conditional_set() {
        let store = RedisStore::new(&StoreConfig::default()).unwrap();
        let key = "strictkv:test:conditional";
        store.del(&[key]).await.unwrap();

        assert!(!store.set_xx(key, "a", None).await.unwrap());
        assert!(store
            .set_nx(key, "b", Some(Duration::from_secs(5)))
            .await
            .unwrap());
        assert!(!store.set_nx(key, "c", None).await.unwrap());
        assert_eq!(store.get(key).await.unwrap(), Some("b".to_string()));

        store.del(&[key]).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_wrong_type_and_not_a_number() {
        let store = RedisStore::new(&StoreConfig::default()).unwrap();
        let text = "strictkv:test:text";
        let list = "strictkv:test:list";
        store.del(&[text, list]).await.unwrap();

        store.set(text, "abc", None).await.unwrap();
        store.rpush(list, &["x"]).await.unwrap();

        assert!(matches!(store.incr(text).await, Err(StoreError::NotANumber)));
        assert!(matches!(store.get(list).await, Err(StoreError::WrongType)));

        store.del(&[text, list]).await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_mget_slots() {
        let store = RedisStore::new(&StoreConfig::default()).unwrap();
        let a = "strictkv:test:mget:a";
        let b = "strictkv:test:mget:b";
        store.del(&[a, b]).await.unwrap();

        store.set(a, "1", None).await.unwrap();
        let slots = store.mget(&[a, b]).await.unwrap();
        assert_eq!(slots, vec![Slot::Value("1".to_string()), Slot::Empty]);

        store.del(&[a]).await.unwrap();
    }
}
