//! String operations

use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::Facade;
use crate::error::{KvError, Result, ValidationError};
use crate::precondition::{self, Precondition};
use crate::store::Store;

impl<S: Store> Facade<S> {
    /// Create a string that must not exist yet.
    ///
    /// Uses the store's atomic create-if-absent write, so of several
    /// concurrent creates of one key exactly one succeeds; the others get
    /// `KeyAlreadyExists`.
    pub async fn create_string_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        const OP: &str = "create_string_ttl";
        precondition::key(OP, key)?;
        precondition::value(OP, value)?;
        precondition::ttl(OP, ttl)?;

        self.create_text(OP, key, value, ttl).await
    }

    /// Write a string whether or not the key exists, replacing any value.
    ///
    /// This is the only unconditional string write; use
    /// [`create_string_ttl`](Self::create_string_ttl) or
    /// [`update_string_ttl`](Self::update_string_ttl) for checked writes.
    pub async fn put_string_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        const OP: &str = "put_string_ttl";
        precondition::key(OP, key)?;
        precondition::value(OP, value)?;
        precondition::ttl(OP, ttl)?;

        debug!(key, ?ttl, "Writing string");
        self.store
            .set(key, value, Some(ttl))
            .await
            .map_err(|e| KvError::store(OP, key, e))
    }

    /// Read a string; absent (or expired) keys are `KeyNotFound`
    pub async fn get_string(&self, key: &str) -> Result<String> {
        const OP: &str = "get_string";
        precondition::key(OP, key)?;

        self.read_text(OP, key).await
    }

    /// Replace the value of an existing string and reset its TTL
    pub async fn update_string_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        const OP: &str = "update_string_ttl";
        precondition::key(OP, key)?;
        precondition::value(OP, value)?;
        precondition::ttl(OP, ttl)?;

        self.update_text(OP, key, value, ttl).await
    }

    /// Replace the value of an existing string, returning the previous value.
    ///
    /// The key loses its TTL, as with the store's get-and-set. If the key
    /// disappears between the existence probe and the write, the result is
    /// `KeyNotFound` but the new value has still been written, with no TTL.
    pub async fn replace_string(&self, key: &str, value: &str) -> Result<String> {
        const OP: &str = "replace_string";
        precondition::key(OP, key)?;
        precondition::value(OP, value)?;

        self.require(OP, key, Precondition::Present).await?;

        debug!(key, "Replacing string");
        let previous = self
            .store
            .get_set(key, value)
            .await
            .map_err(|e| KvError::store(OP, key, e))?;

        previous.ok_or_else(|| {
            warn!(key, "Key vanished between probe and replace; value was written");
            KvError::not_found(OP, key)
        })
    }

    /// Read several strings in one round-trip.
    ///
    /// The result has one entry per key, in input order, with `""` for keys
    /// the store does not hold.
    pub async fn get_strings<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<String>> {
        const OP: &str = "get_strings";
        precondition::keys(OP, keys)?;

        let keys: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
        debug!(count = keys.len(), "Reading strings in batch");

        let slots = self
            .store
            .mget(&keys)
            .await
            .map_err(|e| KvError::store(OP, precondition::joined(&keys), e))?;

        Ok(slots.into_iter().map(|slot| slot.into_string()).collect())
    }

    /// Write several strings in one round-trip, without TTL.
    ///
    /// Returns the store's status token.
    pub async fn set_strings(&self, data: &HashMap<String, String>) -> Result<String> {
        const OP: &str = "set_strings";
        if data.is_empty() {
            return Err(KvError::invalid(OP, ValidationError::EmptyBatch));
        }
        for (key, value) in data {
            precondition::key(OP, key)?;
            if value.is_empty() {
                return Err(KvError::invalid(
                    OP,
                    ValidationError::MissingValueFor(key.clone()),
                ));
            }
        }

        let pairs: Vec<(&str, &str)> = data
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        debug!(count = pairs.len(), "Writing strings in batch");

        self.store.mset(&pairs).await.map_err(|e| {
            let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
            KvError::store(OP, precondition::joined(&keys), e)
        })
    }

    /// Delete a key of any type; fails if nothing was removed
    pub async fn delete(&self, key: &str) -> Result<()> {
        const OP: &str = "delete";
        precondition::key(OP, key)?;

        let removed = self
            .store
            .del(&[key])
            .await
            .map_err(|e| KvError::store(OP, key, e))?;
        if removed == 0 {
            return Err(KvError::not_found(OP, key));
        }
        Ok(())
    }

    /// Delete several keys; fails only if none of them was removed.
    ///
    /// Returns how many were removed.
    pub async fn delete_many<K: AsRef<str>>(&self, keys: &[K]) -> Result<u64> {
        const OP: &str = "delete_many";
        precondition::keys(OP, keys)?;

        let keys: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
        let removed = self
            .store
            .del(&keys)
            .await
            .map_err(|e| KvError::store(OP, precondition::joined(&keys), e))?;
        if removed == 0 {
            return Err(KvError::not_found(OP, precondition::joined(&keys)));
        }

        debug!(removed, requested = keys.len(), "Deleted keys");
        Ok(removed)
    }

    /// Create-if-absent write shared by the string, number and document
    /// creators
    pub(super) async fn create_text(
        &self,
        op: &'static str,
        key: &str,
        text: &str,
        ttl: Duration,
    ) -> Result<()> {
        debug!(op, key, ?ttl, "Creating key");
        let created = self
            .store
            .set_nx(key, text, Some(ttl))
            .await
            .map_err(|e| KvError::store(op, key, e))?;
        if !created {
            return Err(KvError::already_exists(op, key));
        }
        Ok(())
    }

    /// Probe, then update-if-present
    pub(super) async fn update_text(
        &self,
        op: &'static str,
        key: &str,
        text: &str,
        ttl: Duration,
    ) -> Result<()> {
        self.require(op, key, Precondition::Present).await?;

        debug!(op, key, ?ttl, "Updating key");
        let updated = self
            .store
            .set_xx(key, text, Some(ttl))
            .await
            .map_err(|e| KvError::store(op, key, e))?;
        if !updated {
            warn!(op, key, "Key vanished between probe and update");
            return Err(KvError::not_found(op, key));
        }
        Ok(())
    }

    pub(super) async fn read_text(&self, op: &'static str, key: &str) -> Result<String> {
        self.store
            .get(key)
            .await
            .map_err(|e| KvError::store(op, key, e))?
            .ok_or_else(|| KvError::not_found(op, key))
    }
}
