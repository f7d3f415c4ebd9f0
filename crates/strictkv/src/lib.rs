//! Strict typed facade over a Redis-compatible key-value store
//!
//! # Features
//! - Create/read/update/delete for strings, integers, floats, JSON documents and lists
//! - Existence preconditions on every operation (create requires absent, update requires present)
//! - Closed error taxonomy carrying operation name and key
//! - Pluggable [`Store`] backend: [`RedisStore`] (feature `redis`) or [`MemoryStore`]
//!
//! Preconditions are checked with a separate existence probe where the store
//! has no atomic equivalent, so `KeyNotFound`/`KeyAlreadyExists` are
//! point-in-time observations. See [`Facade`] for details.

pub mod config;
pub mod error;
pub mod facade;
pub mod precondition;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{ErrorKind, IndexError, KvError, Result, StoreError, ValidationError};
pub use facade::Facade;
pub use precondition::Precondition;
pub use store::{MemoryStore, Store};
pub use types::Slot;

#[cfg(feature = "redis")]
pub use store::RedisStore;
