//! Store bundle
//!
//! The wizard uses three namespaces: drafts, finalized users, and the session
//! namespace holding the selected-user slot.

use std::sync::Arc;

use pw_core::config::{StorageBackend, StorageConfig};
use tracing::info;

use crate::drafts::DraftStore;
use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::store::KeyValueStore;
use crate::users::{SelectedUserSlot, UserDirectory};

#[derive(Clone)]
pub struct Stores {
    pub drafts: DraftStore,
    pub users: UserDirectory,
    pub selected: SelectedUserSlot,
}

impl Stores {
    /// Build the stores described by the configuration
    pub fn open(config: &StorageConfig) -> Self {
        match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage; nothing will survive a restart");
                Self::in_memory()
            }
            StorageBackend::File => {
                info!(root = ?config.root, "Using file storage");
                Self::from_parts(
                    Arc::new(FileStore::new(config.root.join(&config.drafts_namespace))),
                    Arc::new(FileStore::new(config.root.join(&config.users_namespace))),
                    Arc::new(FileStore::new(config.root.join(&config.session_namespace))),
                )
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(MemoryStore::new("drafts")),
            Arc::new(MemoryStore::new("users")),
            Arc::new(MemoryStore::new("session")),
        )
    }

    pub fn from_parts(
        drafts: Arc<dyn KeyValueStore>,
        users: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            drafts: DraftStore::new(drafts),
            users: UserDirectory::new(users),
            selected: SelectedUserSlot::new(session),
        }
    }
}
