//! In-process store
//!
//! Mirrors the observable behaviour of a Redis server for every [`Store`]
//! primitive: lazy TTL expiry, conditional writes, arithmetic on the decimal
//! text form of a value, WRONGTYPE on string/list confusion, and list keys that
//! vanish once emptied. Used by the test suite and the CLI's offline mode.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use super::Store;
use crate::error::StoreError;
use crate::types::Slot;

/// Stored value
#[derive(Debug, Clone, PartialEq)]
enum Stored {
    Text(String),
    List(VecDeque<String>),
}

/// Entry in the keyspace with its expiry
#[derive(Debug, Clone)]
struct Entry {
    value: Stored,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Stored, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| Instant::now() >= exp)
            .unwrap_or(false)
    }
}

type Keyspace = HashMap<String, Entry>;

/// Live (non-expired) entry, evicting an expired one
fn live<'a>(map: &'a mut Keyspace, key: &str) -> Option<&'a mut Entry> {
    if map.get(key).is_some_and(Entry::is_expired) {
        map.remove(key);
    }
    map.get_mut(key)
}

fn is_live(map: &Keyspace, key: &str) -> bool {
    map.get(key).map(|e| !e.is_expired()).unwrap_or(false)
}

/// Resolve Redis-style inclusive indices against a list length.
/// Returns `None` when the range selects nothing.
fn normalize(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Parse an integer the way Redis does: no sign other than a leading `-`,
/// no leading zeros, no surrounding whitespace.
fn parse_integer(text: &str) -> Result<i64, StoreError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let canonical = text == "0"
        || (digits.bytes().all(|b| b.is_ascii_digit())
            && digits.bytes().next().is_some_and(|b| b != b'0'));
    if !canonical {
        return Err(StoreError::NotANumber);
    }
    text.parse().map_err(|_| StoreError::NotANumber)
}

fn format_float(value: f64) -> String {
    format!("{}", value)
}

/// In-memory [`Store`] implementation
pub struct MemoryStore {
    data: RwLock<Keyspace>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Remove all expired entries, returns count removed
    pub fn purge_expired(&self) -> usize {
        let mut guard = self.data.write();
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired());
        let removed = before - guard.len();
        if removed > 0 {
            debug!(removed, "Purged expired entries");
        }
        removed
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Keyspace) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.ensure_open()?;
        let mut guard = self.data.write();
        f(&mut guard)
    }

    fn conditional_set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
        want_present: bool,
    ) -> Result<bool, StoreError> {
        self.write(|map| {
            let present = live(map, key).is_some();
            if present != want_present {
                return Ok(false);
            }
            map.insert(key.to_string(), Entry::new(Stored::Text(value.to_string()), ttl));
            Ok(true)
        })
    }

    /// Apply `f` to the text of `key`, treating an absent key as `absent`.
    /// The entry keeps its TTL.
    fn update_text(
        &self,
        key: &str,
        absent: &str,
        f: impl FnOnce(&str) -> Result<String, StoreError>,
    ) -> Result<String, StoreError> {
        self.write(|map| match live(map, key) {
            Some(entry) => match &mut entry.value {
                Stored::Text(text) => {
                    let next = f(text.as_str())?;
                    *text = next.clone();
                    Ok(next)
                }
                Stored::List(_) => Err(StoreError::WrongType),
            },
            None => {
                let next = f(absent)?;
                map.insert(key.to_string(), Entry::new(Stored::Text(next.clone()), None));
                Ok(next)
            }
        })
    }

    fn add_integer(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let text = self.update_text(key, "0", |current| {
            let n = parse_integer(current)?;
            let sum = n.checked_add(delta).ok_or(StoreError::NotANumber)?;
            Ok(sum.to_string())
        })?;
        text.parse().map_err(|_| StoreError::NotANumber)
    }

    fn push(&self, key: &str, values: &[&str], front: bool) -> Result<u64, StoreError> {
        if values.is_empty() {
            return Err(StoreError::Backend(
                "wrong number of arguments for push".to_string(),
            ));
        }
        self.write(|map| {
            if live(map, key).is_none() {
                map.insert(key.to_string(), Entry::new(Stored::List(VecDeque::new()), None));
            }
            let entry = map
                .get_mut(key)
                .ok_or_else(|| StoreError::Backend("list vanished during push".to_string()))?;
            match &mut entry.value {
                Stored::List(list) => {
                    for v in values {
                        if front {
                            list.push_front(v.to_string());
                        } else {
                            list.push_back(v.to_string());
                        }
                    }
                    Ok(list.len() as u64)
                }
                Stored::Text(_) => Err(StoreError::WrongType),
            }
        })
    }

    fn pop(&self, key: &str, front: bool) -> Result<Option<String>, StoreError> {
        self.write(|map| {
            let (value, emptied) = match live(map, key) {
                None => return Ok(None),
                Some(entry) => match &mut entry.value {
                    Stored::List(list) => {
                        let value = if front { list.pop_front() } else { list.pop_back() };
                        (value, list.is_empty())
                    }
                    Stored::Text(_) => return Err(StoreError::WrongType),
                },
            };
            if emptied {
                map.remove(key);
            }
            Ok(value)
        })
    }

    /// Run `f` over the list at `key`, removing the key if `f` empties it.
    /// An absent key is treated as an empty list and left absent.
    fn with_list<T>(
        &self,
        key: &str,
        f: impl FnOnce(&mut VecDeque<String>) -> T,
    ) -> Result<T, StoreError> {
        self.write(|map| {
            let mut empty = VecDeque::new();
            let (result, emptied) = match live(map, key) {
                None => (f(&mut empty), false),
                Some(entry) => match &mut entry.value {
                    Stored::List(list) => {
                        let result = f(list);
                        (result, list.is_empty())
                    }
                    Stored::Text(_) => return Err(StoreError::WrongType),
                },
            };
            if emptied {
                map.remove(key);
            }
            Ok(result)
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<String, StoreError> {
        self.ensure_open()?;
        Ok("PONG".to_string())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::Release);
        debug!("Memory store closed");
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.write(|map| {
            map.insert(key.to_string(), Entry::new(Stored::Text(value.to_string()), ttl));
            Ok(())
        })
    }

    async fn set_nx(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        self.conditional_set(key, value, ttl, false)
    }

    async fn set_xx(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        self.conditional_set(key, value, ttl, true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        let guard = self.data.read();
        match guard.get(key) {
            Some(entry) if !entry.is_expired() => match &entry.value {
                Stored::Text(text) => Ok(Some(text.clone())),
                Stored::List(_) => Err(StoreError::WrongType),
            },
            _ => Ok(None),
        }
    }

    async fn get_set(&self, key: &str, value: &str) -> Result<Option<String>, StoreError> {
        self.write(|map| {
            let previous = match live(map, key) {
                Some(entry) => match &entry.value {
                    Stored::Text(text) => Some(text.clone()),
                    Stored::List(_) => return Err(StoreError::WrongType),
                },
                None => None,
            };
            map.insert(key.to_string(), Entry::new(Stored::Text(value.to_string()), None));
            Ok(previous)
        })
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Slot>, StoreError> {
        self.ensure_open()?;
        let guard = self.data.read();
        Ok(keys
            .iter()
            .map(|key| match guard.get(*key) {
                Some(entry) if !entry.is_expired() => match &entry.value {
                    Stored::Text(text) => Slot::Value(text.clone()),
                    Stored::List(_) => Slot::Empty,
                },
                _ => Slot::Empty,
            })
            .collect())
    }

    async fn mset(&self, pairs: &[(&str, &str)]) -> Result<String, StoreError> {
        self.write(|map| {
            for (key, value) in pairs {
                map.insert(key.to_string(), Entry::new(Stored::Text(value.to_string()), None));
            }
            Ok("OK".to_string())
        })
    }

    async fn del(&self, keys: &[&str]) -> Result<u64, StoreError> {
        self.write(|map| {
            let removed = keys
                .iter()
                .filter(|key| map.remove(**key).is_some_and(|e| !e.is_expired()))
                .count();
            Ok(removed as u64)
        })
    }

    async fn exists(&self, keys: &[&str]) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let guard = self.data.read();
        Ok(keys.iter().filter(|key| is_live(&guard, key)).count() as u64)
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        self.add_integer(key, delta)
    }

    async fn decr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let delta = delta.checked_neg().ok_or(StoreError::NotANumber)?;
        self.add_integer(key, delta)
    }

    async fn incr_by_float(&self, key: &str, delta: f64) -> Result<f64, StoreError> {
        let text = self.update_text(key, "0", |current| {
            let n: f64 = current.parse().map_err(|_| StoreError::NotANumber)?;
            let sum = n + delta;
            if !sum.is_finite() {
                return Err(StoreError::NotANumber);
            }
            Ok(format_float(sum))
        })?;
        text.parse().map_err(|_| StoreError::NotANumber)
    }

    async fn lpush(&self, key: &str, values: &[&str]) -> Result<u64, StoreError> {
        self.push(key, values, true)
    }

    async fn rpush(&self, key: &str, values: &[&str]) -> Result<u64, StoreError> {
        self.push(key, values, false)
    }

    async fn lpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.pop(key, true)
    }

    async fn rpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.pop(key, false)
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        self.with_list(key, |list| list.len() as u64)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        self.with_list(key, |list| match normalize(start, stop, list.len()) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<String, StoreError> {
        self.with_list(key, |list| {
            match normalize(start, stop, list.len()) {
                Some((from, to)) => {
                    list.truncate(to + 1);
                    list.drain(..from);
                }
                None => list.clear(),
            }
            "OK".to_string()
        })
    }

    async fn lrem(&self, key: &str, count: i64, value: &str) -> Result<u64, StoreError> {
        self.with_list(key, |list| {
            let limit = if count == 0 {
                usize::MAX
            } else {
                count.unsigned_abs() as usize
            };
            let mut removed = 0usize;
            if count >= 0 {
                let mut i = 0;
                while i < list.len() && removed < limit {
                    if list[i] == value {
                        list.remove(i);
                        removed += 1;
                    } else {
                        i += 1;
                    }
                }
            } else {
                let mut i = list.len();
                while i > 0 && removed < limit {
                    i -= 1;
                    if list[i] == value {
                        list.remove(i);
                        removed += 1;
                    }
                }
            }
            removed as u64
        })
    }
}
