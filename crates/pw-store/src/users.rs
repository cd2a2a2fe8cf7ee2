//! Finalized user records and the selected-user slot

use std::sync::Arc;

use pw_models::{UserId, UserRecord};
use tracing::debug;

use crate::store::{KeyValueStore, StoreError, StoreResult};

/// List of finalized user records, keyed by id
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All records, ordered by name
    pub async fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let mut users = Vec::new();
        for key in self.store.list_keys().await? {
            if let Some(value) = self.store.get(&key).await? {
                users.push(decode(&key, value)?);
            }
        }
        users.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(users)
    }

    pub async fn find(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let key = id.store_key();
        match self.store.get(&key).await? {
            Some(value) => decode(&key, value).map(Some),
            None => Ok(None),
        }
    }

    /// Insert the record or replace the one with the same id.
    ///
    /// Returns `true` when a record with that id already existed.
    pub async fn upsert(&self, user: &UserRecord) -> StoreResult<bool> {
        let key = user.id.store_key();
        let existed = self.store.get(&key).await?.is_some();
        self.store.put(&key, serde_json::to_value(user)?).await?;
        debug!(user_id = %user.id, replaced = existed, "User record stored");
        Ok(existed)
    }

    pub async fn remove(&self, id: UserId) -> StoreResult<()> {
        self.store.remove(&id.store_key()).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.store.list_keys().await?.len())
    }
}

/// Slot holding the record currently open for viewing or editing
#[derive(Clone)]
pub struct SelectedUserSlot {
    store: Arc<dyn KeyValueStore>,
}

impl SelectedUserSlot {
    pub const KEY: &'static str = "selected_user";

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self) -> StoreResult<Option<UserRecord>> {
        match self.store.get(Self::KEY).await? {
            Some(value) => decode(Self::KEY, value).map(Some),
            None => Ok(None),
        }
    }

    pub async fn set(&self, user: &UserRecord) -> StoreResult<()> {
        self.store.put(Self::KEY, serde_json::to_value(user)?).await
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.store.remove(Self::KEY).await
    }
}

fn decode(key: &str, value: serde_json::Value) -> StoreResult<UserRecord> {
    serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}
