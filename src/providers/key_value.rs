//! Simple key-value storage provider.
//!
//! The whole collection is serialized to one JSON array of wire records and
//! stored under a single fixed key. `save` is one write, `load` one read and
//! `clear` one delete.
//!
//! The medium itself sits behind [`KeyValueMedium`]:
//! - [`FileMedium`] keeps one file per key in a directory, written atomically
//!   (temp file + rename).
//! - [`MemoryMedium`] keeps values in a map, for embedding and tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use super::StorageProvider;
use crate::services::record_codec;
use crate::types::backup::LoadedCollection;
use crate::types::bookmark::Bookmark;
use crate::types::errors::{StorageError, StorageResult};

/// Failure reported by a key-value medium.
#[derive(Debug, Error)]
pub enum MediumError {
    /// The medium cannot be reached at all.
    #[error("{0}")]
    Unavailable(String),
    /// The medium refused the write.
    #[error("{0}")]
    Rejected(String),
}

/// A store of string values addressed by string keys.
#[async_trait]
pub trait KeyValueMedium: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, MediumError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), MediumError>;
    async fn remove(&self, key: &str) -> Result<(), MediumError>;
}

// ============================================================================
// File medium
// ============================================================================

/// Key-value medium backed by one file per key.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, MediumError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(MediumError::Unavailable(format!("unsupported key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueMedium for FileMedium {
    async fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MediumError::Unavailable(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MediumError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            MediumError::Unavailable(format!("failed to create {}: {}", self.dir.display(), e))
        })?;

        let temp_path = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&temp_path, value.as_bytes()).await.map_err(|e| {
            MediumError::Rejected(format!("failed to write {}: {}", temp_path.display(), e))
        })?;
        fs::rename(&temp_path, &path).await.map_err(|e| {
            MediumError::Rejected(format!("failed to replace {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), MediumError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediumError::Rejected(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

// ============================================================================
// Memory medium
// ============================================================================

/// Key-value medium held in process memory.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, MediumError> {
        self.values
            .lock()
            .map_err(|e| MediumError::Unavailable(format!("memory medium poisoned: {}", e)))
    }
}

#[async_trait]
impl KeyValueMedium for MemoryMedium {
    async fn get(&self, key: &str) -> Result<Option<String>, MediumError> {
        Ok(self.values()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), MediumError> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), MediumError> {
        self.values()?.remove(key);
        Ok(())
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Provider storing the collection as one value in a [`KeyValueMedium`].
pub struct KeyValueProvider<M: KeyValueMedium> {
    medium: M,
    key: String,
    quota_bytes: Option<usize>,
    op_lock: tokio::sync::Mutex<()>,
}

impl<M: KeyValueMedium> KeyValueProvider<M> {
    pub const NAME: &'static str = "key-value";

    pub fn new(medium: M, key: impl Into<String>) -> Self {
        Self {
            medium,
            key: key.into(),
            quota_bytes: None,
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Rejects saves whose serialized size exceeds `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    fn map_medium_error(err: MediumError) -> StorageError {
        match err {
            MediumError::Unavailable(reason) => StorageError::unavailable(Self::NAME, reason),
            MediumError::Rejected(reason) => StorageError::write_failed(Self::NAME, reason),
        }
    }
}

#[async_trait]
impl<M: KeyValueMedium> StorageProvider for KeyValueProvider<M> {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn save(&self, bookmarks: &[Bookmark]) -> StorageResult<()> {
        let wire = record_codec::encode_all(bookmarks);
        let json = serde_json::to_string(&wire)
            .map_err(|e| StorageError::write_failed(Self::NAME, format!("serialize: {}", e)))?;

        if let Some(quota) = self.quota_bytes {
            if json.len() > quota {
                return Err(StorageError::write_failed(
                    Self::NAME,
                    format!("quota exceeded: {} bytes > {} bytes", json.len(), quota),
                ));
            }
        }

        let _guard = self.op_lock.lock().await;
        self.medium
            .set(&self.key, &json)
            .await
            .map_err(Self::map_medium_error)?;
        debug!(provider = Self::NAME, count = bookmarks.len(), "saved bookmarks");
        Ok(())
    }

    async fn load(&self) -> StorageResult<LoadedCollection> {
        let stored = {
            let _guard = self.op_lock.lock().await;
            self.medium
                .get(&self.key)
                .await
                .map_err(Self::map_medium_error)?
        };

        let Some(text) = stored else {
            return Ok(LoadedCollection::default());
        };
        if text.trim().is_empty() {
            return Ok(LoadedCollection::default());
        }

        let values = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(values)) => values,
            Ok(_) => {
                return Err(StorageError::malformed(0, "stored value is not a JSON array"));
            }
            Err(e) => {
                return Err(StorageError::malformed(0, format!("stored value is not JSON: {}", e)));
            }
        };

        let loaded = record_codec::decode_values(values);
        debug!(
            provider = Self::NAME,
            count = loaded.len(),
            skipped = loaded.skipped.len(),
            "loaded bookmarks"
        );
        Ok(loaded)
    }

    async fn clear(&self) -> StorageResult<()> {
        let _guard = self.op_lock.lock().await;
        self.medium
            .remove(&self.key)
            .await
            .map_err(Self::map_medium_error)
    }
}
