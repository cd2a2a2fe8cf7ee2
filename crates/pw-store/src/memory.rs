//! In-memory store

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{validate_key, KeyValueStore, StoreError, StoreResult};

/// Non-durable store backed by a map
///
/// Reads and writes can be switched off independently to simulate a store
/// that has become unavailable (quota exceeded, storage disabled, ...).
pub struct MemoryStore {
    name: String,
    entries: RwLock<BTreeMap<String, Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(BTreeMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every operation fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail_reads.store(unavailable, Ordering::SeqCst);
        self.fail_writes.store(unavailable, Ordering::SeqCst);
    }

    /// Make `put`, `remove` and `clear` fail while reads keep working
    pub fn set_writes_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check_reads(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(self.name.clone()));
        }
        Ok(())
    }

    fn check_writes(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(self.name.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        validate_key(key)?;
        self.check_writes()?;
        self.entries.write().await.insert(key.to_string(), value);
        debug!(store = %self.name, key, "Entry stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        validate_key(key)?;
        self.check_reads()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn list_keys(&self) -> StoreResult<BTreeSet<String>> {
        self.check_reads()?;
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.check_writes()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.check_writes()?;
        self.entries.write().await.clear();
        debug!(store = %self.name, "Store cleared");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
