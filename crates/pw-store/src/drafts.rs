//! Draft section store
//!
//! Holds at most one [`DraftSection`] per section key. Writing a section that
//! already exists replaces it.

use std::collections::BTreeSet;
use std::sync::Arc;

use pw_models::{DraftSection, Section};
use tracing::{debug, info};

use crate::store::{KeyValueStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist one section, overwriting any previous entry for it
    pub async fn save(&self, draft: &DraftSection) -> StoreResult<()> {
        let section = draft.section();
        self.store
            .put(section.key(), serde_json::to_value(draft)?)
            .await?;
        debug!(section = %section, user_id = %draft.user_id, "Draft section saved");
        Ok(())
    }

    /// Load one section, `None` when it was never saved
    pub async fn load(&self, section: Section) -> StoreResult<Option<DraftSection>> {
        let Some(value) = self.store.get(section.key()).await? else {
            return Ok(None);
        };

        let draft: DraftSection =
            serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                key: section.key().to_string(),
                message: e.to_string(),
            })?;

        if draft.section() != section {
            return Err(StoreError::Corrupt {
                key: section.key().to_string(),
                message: format!("entry holds the {} section", draft.section()),
            });
        }

        Ok(Some(draft))
    }

    /// Every section present, in step order
    pub async fn load_all(&self) -> StoreResult<Vec<DraftSection>> {
        let keys = self.keys().await?;
        let mut drafts = Vec::with_capacity(keys.len());
        for section in Section::ALL {
            if !keys.contains(section.key()) {
                continue;
            }
            if let Some(draft) = self.load(section).await? {
                drafts.push(draft);
            }
        }
        Ok(drafts)
    }

    /// Raw key set of the draft namespace
    pub async fn keys(&self) -> StoreResult<BTreeSet<String>> {
        self.store.list_keys().await
    }

    /// Drop the whole draft
    pub async fn clear(&self) -> StoreResult<()> {
        self.store.clear().await?;
        info!(store = self.store.name(), "Draft cleared");
        Ok(())
    }
}
