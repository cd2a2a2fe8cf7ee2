//! File-backed durable store
//!
//! One directory per namespace, one pretty-printed JSON document per key.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use crate::store::{validate_key, KeyValueStore, StoreError, StoreResult};

const EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// Durable store rooted at one directory
///
/// Writes go to a temp file that is synced and then renamed over the target,
/// so a crash leaves either the old or the new document, never a torn one.
/// A missing directory is an empty namespace.
pub struct FileStore {
    root: PathBuf,
    name: String,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Self { root, name }
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, EXTENSION)))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, TEMP_EXTENSION))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    #[instrument(skip(self, value), fields(store = %self.name))]
    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).await?;

        let data = serde_json::to_vec_pretty(&value)?;
        let temp = self.temp_path_for(key);

        let mut file = fs::File::create(&temp).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, &path).await?;

        debug!(path = ?path, size = data.len(), "Entry stored");
        Ok(())
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let path = self.path_for(key)?;

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    async fn list_keys(&self) -> StoreResult<BTreeSet<String>> {
        let mut keys = BTreeSet::new();

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if validate_key(stem).is_ok() => {
                    keys.insert(stem.to_string());
                }
                _ => warn!(path = ?path, "Ignoring unexpected file in store"),
            }
        }

        Ok(keys)
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = ?path, "Entry removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(store = %self.name))]
    async fn clear(&self) -> StoreResult<()> {
        for key in self.list_keys().await? {
            self.remove(&key).await?;
        }
        debug!("Store cleared");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
