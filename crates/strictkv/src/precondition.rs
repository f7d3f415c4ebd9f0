//! Argument validation and existence preconditions
//!
//! Every facade operation runs the syntactic checks here before touching the
//! store, then (when its semantics need it) asks the store whether the key
//! exists and checks the answer against a [`Precondition`].

use std::time::Duration;

use crate::error::{IndexError, KvError, Result, ValidationError};

/// Existence state an operation requires of its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Key must not exist (create)
    Absent,
    /// Key must exist (read, update, arithmetic, pop)
    Present,
}

impl Precondition {
    /// Check an observed existence state against this precondition
    pub fn check(self, op: &'static str, key: &str, present: bool) -> Result<()> {
        match (self, present) {
            (Precondition::Present, false) => Err(KvError::not_found(op, key)),
            (Precondition::Absent, true) => Err(KvError::already_exists(op, key)),
            _ => Ok(()),
        }
    }
}

pub(crate) fn key(op: &'static str, key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(KvError::invalid(op, ValidationError::MissingKey));
    }
    Ok(())
}

pub(crate) fn value(op: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(KvError::invalid(op, ValidationError::MissingValue));
    }
    Ok(())
}

pub(crate) fn ttl(op: &'static str, ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(KvError::invalid(op, ValidationError::MissingTtl));
    }
    Ok(())
}

pub(crate) fn finite(op: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(KvError::invalid(op, ValidationError::NonFinite));
    }
    Ok(())
}

/// Non-empty batch of non-empty keys
pub(crate) fn keys<K: AsRef<str>>(op: &'static str, keys: &[K]) -> Result<()> {
    if keys.is_empty() {
        return Err(KvError::invalid(op, ValidationError::EmptyBatch));
    }
    if let Some(i) = keys.iter().position(|k| k.as_ref().is_empty()) {
        return Err(KvError::invalid(op, ValidationError::MissingKeyAt(i)));
    }
    Ok(())
}

/// Non-empty sequence of list values
pub(crate) fn values<V: AsRef<str>>(op: &'static str, values: &[V]) -> Result<()> {
    if values.is_empty() {
        return Err(KvError::invalid(op, ValidationError::MissingValue));
    }
    Ok(())
}

/// `start < stop`, both non-negative
pub(crate) fn range(op: &'static str, key: &str, start: i64, stop: i64) -> Result<()> {
    if start >= stop || start < 0 || stop < 0 {
        return Err(KvError::index(op, key, IndexError::InvalidRange { start, stop }));
    }
    Ok(())
}

/// `stop` must address an element of a list of `len` elements
pub(crate) fn within(op: &'static str, key: &str, stop: i64, len: u64) -> Result<()> {
    let fits = u64::try_from(stop)
        .ok()
        .and_then(|s| s.checked_add(1))
        .is_some_and(|end| end <= len);
    if !fits {
        return Err(KvError::index(op, key, IndexError::StopOutOfRange { stop, len }));
    }
    Ok(())
}

/// Label for errors that concern several keys
pub(crate) fn joined<K: AsRef<str>>(keys: &[K]) -> String {
    let parts: Vec<&str> = keys.iter().map(|k| k.as_ref()).collect();
    parts.join(",")
}
