//! JSON file backed store used by the command line.
//!
//! The whole state (options and live cache entries) is read once on
//! [`FileStore::load`] and written back by [`FileStore::save`] using a
//! write-then-rename so readers never observe a half-written file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use super::{CacheEntry, CacheStore, MemoryStore, OptionsStore};
use crate::core::TemplateError;

/// On-disk representation of a [`FileStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub cache: BTreeMap<String, CacheEntry>,
}

/// A [`MemoryStore`] persisted to a JSON state file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Load the state file, or start empty when it does not exist yet.
    pub async fn load(path: &Path) -> Result<Self> {
        let snapshot = if path.exists() {
            let content = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read state file {}", path.display()))?;
            serde_json::from_str::<StoreSnapshot>(&content)
                .with_context(|| format!("Failed to parse state file {}", path.display()))?
        } else {
            tracing::debug!("State file {} not found, starting empty", path.display());
            StoreSnapshot::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_parts(snapshot.options, snapshot.cache),
        })
    }

    /// Write the current state back to disk.
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let snapshot = StoreSnapshot {
            options: self.inner.options_snapshot(),
            cache: self.inner.cache_snapshot(),
        };
        let content =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize state")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace state file {}", self.path.display()))?;

        tracing::debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OptionsStore for FileStore {
    fn get_option(&self, name: &str) -> Option<String> {
        self.inner.get_option(name)
    }

    fn set_option(&self, name: &str, value: &str) -> Result<(), TemplateError> {
        self.inner.set_option(name, value)
    }

    fn delete_option(&self, name: &str) -> Result<bool, TemplateError> {
        self.inner.delete_option(name)
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) {
        self.inner.set(key, value, ttl);
    }

    fn delete(&self, key: &str) -> bool {
        self.inner.delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.inner.keys_with_prefix(prefix)
    }
}
