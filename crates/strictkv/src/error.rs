//! Facade error taxonomy
//!
//! Every failure the facade reports is a [`KvError`]. Variants carry the
//! operation name and the key(s) involved so a caller can diagnose a failure
//! without inspecting the store. [`KvError::kind`] folds the variants onto the
//! closed [`ErrorKind`] set.
//!
//! `KeyNotFound` and `KeyAlreadyExists` produced by an existence probe are a
//! point-in-time observation: another client may change the key between the
//! probe and the mutation that follows it.

use thiserror::Error;

/// Result type for facade operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Closed set of error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    KeyNotFound,
    KeyAlreadyExists,
    ValueNotFound,
    Index,
    Serialization,
    Store,
    Configuration,
}

/// Syntactic argument failures, detected before any store access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing key")]
    MissingKey,

    #[error("missing key at index {0}")]
    MissingKeyAt(usize),

    #[error("missing value")]
    MissingValue,

    #[error("missing value for key {0}")]
    MissingValueFor(String),

    #[error("missing TTL")]
    MissingTtl,

    #[error("number is not finite")]
    NonFinite,

    #[error("empty batch")]
    EmptyBatch,
}

/// List range failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("invalid range [{start}, {stop}]")]
    InvalidRange { start: i64, stop: i64 },

    #[error("stop index {stop} is over list size {len}")]
    StopOutOfRange { stop: i64, len: u64 },
}

/// Errors reported by a [`Store`](crate::store::Store) implementation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("value is not a valid number")]
    NotANumber,

    #[error("operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("store is closed")]
    Closed,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors returned by facade operations
#[derive(Error, Debug)]
pub enum KvError {
    #[error("{op}: invalid argument: {reason}")]
    Validation {
        op: &'static str,
        reason: ValidationError,
    },

    #[error("{op}: key not found: {key}")]
    KeyNotFound { op: &'static str, key: String },

    #[error("{op}: key already exists: {key}")]
    KeyAlreadyExists { op: &'static str, key: String },

    #[error("{op}: value {value:?} not found in {key}")]
    ValueNotFound {
        op: &'static str,
        key: String,
        value: String,
    },

    #[error("{op}: index error on {key}: {reason}")]
    Index {
        op: &'static str,
        key: String,
        reason: IndexError,
    },

    #[error("{op}: failed to serialize value for {key}: {source}")]
    Serialization {
        op: &'static str,
        key: String,
        source: serde_json::Error,
    },

    #[error("{op}: failed to deserialize value of {key}: {source}")]
    Deserialization {
        op: &'static str,
        key: String,
        source: serde_json::Error,
    },

    #[error("{op}: store error on {key}: {source}")]
    Store {
        op: &'static str,
        key: String,
        source: StoreError,
    },

    #[error("handshake failed: expected PONG, got {response:?}")]
    Handshake { response: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl KvError {
    pub(crate) fn invalid(op: &'static str, reason: ValidationError) -> Self {
        KvError::Validation { op, reason }
    }

    pub(crate) fn not_found(op: &'static str, key: impl Into<String>) -> Self {
        KvError::KeyNotFound { op, key: key.into() }
    }

    pub(crate) fn already_exists(op: &'static str, key: impl Into<String>) -> Self {
        KvError::KeyAlreadyExists { op, key: key.into() }
    }

    pub(crate) fn index(op: &'static str, key: impl Into<String>, reason: IndexError) -> Self {
        KvError::Index {
            op,
            key: key.into(),
            reason,
        }
    }

    pub(crate) fn store(op: &'static str, key: impl Into<String>, source: StoreError) -> Self {
        KvError::Store {
            op,
            key: key.into(),
            source,
        }
    }

    /// The taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            KvError::Validation { .. } => ErrorKind::Validation,
            KvError::KeyNotFound { .. } => ErrorKind::KeyNotFound,
            KvError::KeyAlreadyExists { .. } => ErrorKind::KeyAlreadyExists,
            KvError::ValueNotFound { .. } => ErrorKind::ValueNotFound,
            KvError::Index { .. } => ErrorKind::Index,
            KvError::Serialization { .. } | KvError::Deserialization { .. } => {
                ErrorKind::Serialization
            }
            KvError::Store { .. } | KvError::Handshake { .. } => ErrorKind::Store,
            KvError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Operation that produced the error, if any
    pub fn op(&self) -> Option<&'static str> {
        match self {
            KvError::Validation { op, .. }
            | KvError::KeyNotFound { op, .. }
            | KvError::KeyAlreadyExists { op, .. }
            | KvError::ValueNotFound { op, .. }
            | KvError::Index { op, .. }
            | KvError::Serialization { op, .. }
            | KvError::Deserialization { op, .. }
            | KvError::Store { op, .. } => Some(op),
            KvError::Handshake { .. } => Some("ping"),
            KvError::Configuration(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::KeyNotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::KeyAlreadyExists
    }

    /// Underlying store error, when the failure came from the store
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            KvError::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}
