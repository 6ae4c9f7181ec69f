// LinkVault Export/Import
// Serializes the in-memory collection to a versioned backup document and parses it back.
// Works on the collection directly and never touches the provider chain.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::warn;

use crate::services::record_codec;
use crate::types::backup::{BackupDocument, ImportReport, BACKUP_FORMAT_VERSION};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{StorageError, StorageResult};

/// Builds and reads LinkVault backup documents.
pub struct ExportImportManager;

impl ExportImportManager {
    /// Wraps the collection in a backup document stamped with the current time.
    pub fn export_to_document(bookmarks: &[Bookmark]) -> BackupDocument {
        Self::export_to_document_at(bookmarks, Utc::now())
    }

    /// Same as [`export_to_document`](Self::export_to_document) with an
    /// explicit export time.
    pub fn export_to_document_at(bookmarks: &[Bookmark], exported_at: DateTime<Utc>) -> BackupDocument {
        BackupDocument {
            version: BACKUP_FORMAT_VERSION.to_string(),
            exported_at: record_codec::format_timestamp(&exported_at),
            bookmarks: record_codec::encode_all(bookmarks),
        }
    }

    /// Serializes a document as two-space indented JSON.
    pub fn serialize_document(doc: &BackupDocument) -> StorageResult<String> {
        serde_json::to_string_pretty(doc)
            .map_err(|e| StorageError::InvalidFormat(format!("failed to serialize backup: {}", e)))
    }

    /// Convenience for export followed by serialization.
    pub fn export_to_json(bookmarks: &[Bookmark]) -> StorageResult<String> {
        Self::serialize_document(&Self::export_to_document(bookmarks))
    }

    /// Parses backup text into bookmarks.
    ///
    /// The text must be a JSON object with a `bookmarks` array, otherwise the
    /// import fails with `InvalidFormat` and nothing is returned. Individual
    /// records that fail validation are skipped and listed in the report.
    pub fn import_from_text(text: &str) -> StorageResult<ImportReport> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| StorageError::InvalidFormat(format!("not valid JSON: {}", e)))?;

        let Value::Object(mut fields) = root else {
            return Err(StorageError::InvalidFormat(
                "backup must be a JSON object".to_string(),
            ));
        };

        let records = match fields.remove("bookmarks") {
            Some(Value::Array(records)) => records,
            Some(_) => {
                return Err(StorageError::InvalidFormat(
                    "'bookmarks' must be an array".to_string(),
                ))
            }
            None => {
                return Err(StorageError::InvalidFormat(
                    "missing 'bookmarks' array".to_string(),
                ))
            }
        };

        match fields.get("version").and_then(Value::as_str) {
            Some(BACKUP_FORMAT_VERSION) => {}
            other => warn!(version = ?other, "importing backup with unrecognised version"),
        }

        let report = record_codec::decode_values(records);
        if !report.skipped.is_empty() {
            warn!(
                imported = report.len(),
                skipped = report.skipped.len(),
                "import skipped malformed records"
            );
        }
        Ok(report)
    }

    /// Suggested file name for a backup taken on `date`.
    pub fn backup_file_name(date: NaiveDate) -> String {
        format!("linkvault-backup-{}.json", date.format("%Y-%m-%d"))
    }

    /// Writes a backup of `bookmarks` into `dir` and returns the file path.
    pub async fn write_backup(dir: &Path, bookmarks: &[Bookmark]) -> StorageResult<PathBuf> {
        let doc = Self::export_to_document(bookmarks);
        let text = Self::serialize_document(&doc)?;
        let path = dir.join(Self::backup_file_name(Utc::now().date_naive()));
        tokio::fs::write(&path, text).await.map_err(|e| {
            StorageError::write_failed("backup-file", format!("{}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    /// Reads and imports a backup file.
    pub async fn read_backup(path: &Path) -> StorageResult<ImportReport> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            StorageError::unavailable("backup-file", format!("{}: {}", path.display(), e))
        })?;
        Self::import_from_text(&text)
    }
}
