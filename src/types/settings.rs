use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::platform;

/// Fixed key under which the key-value medium stores the collection.
pub const DEFAULT_NAMESPACE_KEY: &str = "linkvault-bookmarks";
/// File name of the SQLite database backing the table medium.
pub const DEFAULT_DATABASE_FILE: &str = "linkvault.db";
/// Comparable to the per-origin budget browsers give simple key-value stores.
pub const DEFAULT_KEY_VALUE_QUOTA_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;

/// Settings for the storage layer, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding both media. `None` means the platform data dir.
    pub data_dir: Option<PathBuf>,
    pub namespace_key: String,
    pub database_file: String,
    /// Offer the transactional table medium ahead of the key-value one.
    pub enable_table_provider: bool,
    /// Upper bound for one provider attempt; 0 disables the timeout.
    pub provider_timeout_ms: u64,
    /// Largest serialized collection the key-value medium accepts.
    pub key_value_quota_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            namespace_key: DEFAULT_NAMESPACE_KEY.to_string(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            enable_table_provider: true,
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
            key_value_quota_bytes: DEFAULT_KEY_VALUE_QUOTA_BYTES,
        }
    }
}

impl StorageSettings {
    /// Directory where the media are stored, resolving the platform default.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(platform::get_data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.resolved_data_dir().join(&self.database_file)
    }
}
