use thiserror::Error;

// === StorageError ===

/// Errors raised by storage providers, the storage manager, and the
/// export/import layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage medium is not present or cannot be opened.
    #[error("Storage backend unavailable ({provider}): {reason}")]
    BackendUnavailable { provider: String, reason: String },

    /// The medium rejected a write or a transaction failed.
    #[error("Storage write failed ({provider}): {reason}")]
    WriteFailed { provider: String, reason: String },

    /// A single stored or imported record could not be decoded.
    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// A backup document does not have the expected top-level shape.
    #[error("Invalid backup format: {0}")]
    InvalidFormat(String),

    /// Every provider in the chain rejected a save.
    #[error("All storage providers failed: {}", format_attempts(.attempts))]
    AllProvidersFailed { attempts: Vec<ProviderFailure> },
}

/// One failed attempt recorded while walking the provider chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
}

fn format_attempts(attempts: &[ProviderFailure]) -> String {
    if attempts.is_empty() {
        return "no providers configured".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl StorageError {
    /// Create a backend-unavailable error for the named provider.
    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a write-failed error for the named provider.
    pub fn write_failed(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-record error for the record at `index`.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}

/// Convenience alias for storage results.
pub type StorageResult<T> = Result<T, StorageError>;

// === BookmarkError ===

/// Errors surfaced to the collaborator when editing the collection.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// Title was empty after trimming.
    #[error("Bookmark title is required")]
    EmptyTitle,
    /// URL was empty after trimming.
    #[error("Bookmark URL is required")]
    EmptyUrl,
    /// No bookmark with the given ID exists in the collection.
    #[error("Bookmark not found: {0}")]
    NotFound(String),
    /// The change was applied in memory but could not be persisted.
    #[error("Bookmark storage error: {0}")]
    Storage(#[from] StorageError),
}

// === SettingsError ===

/// Errors related to loading or saving storage settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// A settings value is out of range.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
