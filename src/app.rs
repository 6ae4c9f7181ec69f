//! App Core for LinkVault.
//!
//! Owns the authoritative in-memory bookmark collection and the
//! [`StorageManager`] it is persisted through. The storage layer keeps no
//! copy of its own: the collection is loaded once on open, and every
//! mutation afterwards saves the full collection.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::managers::storage_manager::StorageManager;
use crate::services::export_import::ExportImportManager;
use crate::types::backup::ImportReport;
use crate::types::bookmark::{Bookmark, BookmarkDraft};
use crate::types::errors::{BookmarkError, StorageResult};
use crate::types::settings::StorageSettings;

/// Serialized backup ready to be offered as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupExport {
    pub file_name: String,
    pub content: String,
}

/// Top-level application state.
pub struct App {
    storage: StorageManager,
    bookmarks: Vec<Bookmark>,
}

impl App {
    /// Builds the provider chain from `settings` and loads the stored collection.
    pub async fn open(settings: &StorageSettings) -> Self {
        let data_dir = settings.resolved_data_dir();
        if let Err(e) = tokio::fs::create_dir_all(&data_dir).await {
            warn!(dir = %data_dir.display(), error = %e, "cannot create data directory");
        }

        let mut app = Self::with_manager(StorageManager::from_settings(settings));
        app.load().await;
        app
    }

    /// Wraps an already constructed manager. Nothing is loaded yet.
    pub fn with_manager(storage: StorageManager) -> Self {
        Self {
            storage,
            bookmarks: Vec::new(),
        }
    }

    /// Replaces the in-memory collection with what storage holds.
    pub async fn load(&mut self) -> usize {
        self.bookmarks = self.storage.load().await;
        info!(
            count = self.bookmarks.len(),
            provider = %self.storage.current_provider_name(),
            "bookmarks loaded"
        );
        self.bookmarks.len()
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub fn current_provider_name(&self) -> String {
        self.storage.current_provider_name()
    }

    pub fn find(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.id == id)
    }

    async fn persist(&self) -> Result<(), BookmarkError> {
        self.storage.save(&self.bookmarks).await?;
        Ok(())
    }

    /// Creates a bookmark at the front of the collection and saves.
    ///
    /// If saving fails the bookmark stays in memory and the error is returned
    /// so the user can be told the change may not be durable.
    pub async fn add_bookmark(&mut self, draft: &BookmarkDraft) -> Result<Bookmark, BookmarkError> {
        let bookmark = Bookmark::new(draft)?;
        self.bookmarks.insert(0, bookmark.clone());
        self.persist().await?;
        Ok(bookmark)
    }

    /// Applies a draft to an existing bookmark and saves.
    pub async fn update_bookmark(
        &mut self,
        id: &str,
        draft: &BookmarkDraft,
    ) -> Result<Bookmark, BookmarkError> {
        let bookmark = self
            .bookmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;
        bookmark.apply(draft)?;
        let updated = bookmark.clone();
        self.persist().await?;
        Ok(updated)
    }

    /// Removes a bookmark and saves, including when the collection becomes empty.
    pub async fn delete_bookmark(&mut self, id: &str) -> Result<(), BookmarkError> {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != id);
        if self.bookmarks.len() == before {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        self.persist().await
    }

    /// Prepends the built-in sample bookmarks and saves.
    pub async fn add_sample_data(&mut self) -> Result<usize, BookmarkError> {
        let samples = sample_bookmarks()?;
        let count = samples.len();
        self.bookmarks.splice(0..0, samples);
        self.persist().await?;
        Ok(count)
    }

    /// Empties the collection and clears every provider, best effort.
    pub async fn clear_all(&mut self) {
        self.bookmarks.clear();
        self.storage.clear().await;
    }

    /// Serializes the current collection as a backup document.
    pub fn export_backup(&self) -> StorageResult<BackupExport> {
        let content = ExportImportManager::export_to_json(&self.bookmarks)?;
        Ok(BackupExport {
            file_name: ExportImportManager::backup_file_name(Utc::now().date_naive()),
            content,
        })
    }

    /// Writes a backup file into `dir`.
    pub async fn write_backup(&self, dir: &Path) -> StorageResult<PathBuf> {
        ExportImportManager::write_backup(dir, &self.bookmarks).await
    }

    /// Appends the bookmarks in `text` to the collection and saves.
    ///
    /// A document without a `bookmarks` array leaves the collection as it was.
    pub async fn import_backup(&mut self, text: &str) -> Result<ImportReport, BookmarkError> {
        let report = ExportImportManager::import_from_text(text)?;
        self.bookmarks.extend(report.bookmarks.iter().cloned());
        self.persist().await?;
        Ok(report)
    }
}

/// The sample set offered to new users.
pub fn sample_bookmarks() -> Result<Vec<Bookmark>, BookmarkError> {
    [
        BookmarkDraft::new(
            "Next.js Documentation",
            "https://nextjs.org/docs",
            "Official Next.js documentation with tutorials and API reference",
            "react, nextjs, documentation, frontend",
        ),
        BookmarkDraft::new(
            "Tailwind CSS",
            "https://tailwindcss.com",
            "A utility-first CSS framework for rapidly building custom user interfaces",
            "css, styling, frontend, utility",
        ),
        BookmarkDraft::new(
            "GitHub",
            "https://github.com",
            "Where the world builds software. Millions of developers and companies build, ship, and maintain their software on GitHub",
            "git, development, code, collaboration",
        ),
    ]
    .iter()
    .map(Bookmark::new)
    .collect()
}
