//! JSON document operations

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::Facade;
use crate::error::{KvError, Result};
use crate::precondition;
use crate::store::Store;

fn encode<T: Serialize>(op: &'static str, key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| KvError::Serialization {
        op,
        key: key.to_string(),
        source,
    })
}

impl<S: Store> Facade<S> {
    /// Serialize `value` and store it under a key that must not exist yet
    pub async fn create_json_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        const OP: &str = "create_json_ttl";
        precondition::key(OP, key)?;
        precondition::ttl(OP, ttl)?;

        let text = encode(OP, key, value)?;
        self.create_text(OP, key, &text, ttl).await
    }

    /// Read and deserialize a document.
    ///
    /// Stored text that is not valid JSON for `T` is a `Deserialization`
    /// error, distinct from a missing key.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        const OP: &str = "get_json";
        precondition::key(OP, key)?;

        let text = self.read_text(OP, key).await?;
        serde_json::from_str(&text).map_err(|source| KvError::Deserialization {
            op: OP,
            key: key.to_string(),
            source,
        })
    }

    /// Replace an existing document and reset its TTL
    pub async fn update_json_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        const OP: &str = "update_json_ttl";
        precondition::key(OP, key)?;
        precondition::ttl(OP, ttl)?;

        let text = encode(OP, key, value)?;
        self.update_text(OP, key, &text, ttl).await
    }
}
