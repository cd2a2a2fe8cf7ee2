//! Key-value store capability
//!
//! Every component that needs durable state takes an `Arc<dyn KeyValueStore>`
//! instead of reaching for a global, so tests can swap in [`MemoryStore`].
//!
//! [`MemoryStore`]: crate::MemoryStore

use std::collections::BTreeSet;

use async_trait::async_trait;
use pw_core::error::WizardError;
use serde_json::Value;
use thiserror::Error;

/// Error type for store operations
///
/// A missing key is not an error: `get` returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt entry {key}: {message}")]
    Corrupt { key: String, message: String },

    #[error("Store {0} is unavailable")]
    Unavailable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for WizardError {
    fn from(err: StoreError) -> Self {
        WizardError::StoreUnavailable(err.to_string())
    }
}

/// Durable key-value record store for one namespace
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Insert or overwrite the value at `key`
    async fn put(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Read the value at `key`
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// All keys currently stored
    async fn list_keys(&self) -> StoreResult<BTreeSet<String>>;

    /// Remove `key`. Removing an absent key is a no-op.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Remove every key. Clearing an empty store is a no-op.
    async fn clear(&self) -> StoreResult<()>;

    /// Namespace name for logging
    fn name(&self) -> &str;
}

/// Reject keys that could escape a namespace or collide with temp files
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
