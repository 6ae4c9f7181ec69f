use serde::{Deserialize, Serialize};

use crate::types::bookmark::{Bookmark, WireBookmark};

/// Current backup format version written by the exporter.
pub const BACKUP_FORMAT_VERSION: &str = "1.0";

/// Versioned envelope produced by export and consumed by import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: String,
    pub exported_at: String,
    pub bookmarks: Vec<WireBookmark>,
}

/// A record dropped while loading or importing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the record in the stored or imported sequence.
    pub index: usize,
    /// The record's `id`, when it could be read.
    pub id: Option<String>,
    pub reason: String,
}

/// Result of decoding a stored or imported collection.
///
/// Valid records are kept in their original order; invalid ones are listed
/// in `skipped` instead of failing the whole operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedCollection {
    pub bookmarks: Vec<Bookmark>,
    pub skipped: Vec<SkippedRecord>,
}

impl LoadedCollection {
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }
}

/// Import results share the load shape.
pub type ImportReport = LoadedCollection;
