//! # pw-store
//!
//! Durable storage layer for Profile Wizard.
//!
//! This crate provides:
//!
//! - The [`KeyValueStore`] capability (get/put/list-keys/remove/clear)
//! - An in-memory backend and a file-backed durable backend
//! - Typed stores for draft sections, finalized users, and the selected-user slot
//!
//! ## Example
//!
//! ```ignore
//! use pw_store::Stores;
//!
//! let stores = Stores::open(&config.storage)?;
//! let keys = stores.drafts.keys().await?;
//! ```

pub mod drafts;
pub mod file;
pub mod memory;
pub mod store;
pub mod stores;
pub mod users;

// Re-exports
pub use drafts::DraftStore;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{KeyValueStore, StoreError, StoreResult};
pub use stores::Stores;
pub use users::{SelectedUserSlot, UserDirectory};
