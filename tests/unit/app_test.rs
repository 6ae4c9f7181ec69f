//! Unit tests for the application core.

use async_trait::async_trait;
use linkvault::app::{sample_bookmarks, App};
use linkvault::managers::storage_manager::StorageManager;
use linkvault::providers::{KeyValueProvider, MemoryMedium, StorageProvider};
use linkvault::types::backup::LoadedCollection;
use linkvault::types::bookmark::{Bookmark, BookmarkDraft};
use linkvault::types::errors::{BookmarkError, StorageError, StorageResult};
use linkvault::types::settings::StorageSettings;
use tempfile::TempDir;

fn settings_in(dir: &TempDir) -> StorageSettings {
    StorageSettings {
        data_dir: Some(dir.path().join("data")),
        ..StorageSettings::default()
    }
}

fn draft(title: &str, url: &str) -> BookmarkDraft {
    BookmarkDraft::new(title, url, "", "")
}

struct RejectingProvider;

#[async_trait]
impl StorageProvider for RejectingProvider {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn save(&self, _bookmarks: &[Bookmark]) -> StorageResult<()> {
        Err(StorageError::write_failed("rejecting", "disk full"))
    }

    async fn load(&self) -> StorageResult<LoadedCollection> {
        Ok(LoadedCollection::default())
    }

    async fn clear(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn fresh_install_opens_empty() {
    let dir = TempDir::new().unwrap();
    let app = App::open(&settings_in(&dir)).await;
    assert!(app.bookmarks().is_empty());
    assert_eq!(app.current_provider_name(), "sqlite-table");
}

#[tokio::test]
async fn add_prepends_and_persists() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir);
    let mut app = App::open(&settings).await;

    let first = app.add_bookmark(&draft("First", "https://first.test")).await.unwrap();
    let second = app.add_bookmark(&draft("Second", "https://second.test")).await.unwrap();
    assert_eq!(app.bookmarks(), &[second.clone(), first.clone()]);

    let reopened = App::open(&settings).await;
    assert_eq!(reopened.bookmarks(), &[second, first]);
}

#[tokio::test]
async fn invalid_draft_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut app = App::open(&settings_in(&dir)).await;

    let err = app.add_bookmark(&draft("  ", "https://x.test")).await.unwrap_err();
    assert!(matches!(err, BookmarkError::EmptyTitle));
    assert!(app.bookmarks().is_empty());
}

#[tokio::test]
async fn update_edits_in_place() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir);
    let mut app = App::open(&settings).await;
    let a = app.add_bookmark(&draft("A", "https://a.test")).await.unwrap();
    let b = app.add_bookmark(&draft("B", "https://b.test")).await.unwrap();

    let edited = BookmarkDraft::new("A2", "https://a2.test", "new", "x, y");
    let updated = app.update_bookmark(&a.id, &edited).await.unwrap();

    assert_eq!(updated.id, a.id);
    assert_eq!(updated.created_at, a.created_at);
    assert!(updated.updated_at > a.updated_at);
    assert_eq!(updated.tags, vec!["x", "y"]);
    assert_eq!(app.bookmarks()[0], b);
    assert_eq!(app.bookmarks()[1], updated);

    let reopened = App::open(&settings).await;
    assert_eq!(reopened.find(&a.id), Some(&updated));
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut app = App::open(&settings_in(&dir)).await;
    let err = app.update_bookmark("missing", &draft("A", "https://a.test")).await.unwrap_err();
    assert!(matches!(err, BookmarkError::NotFound(ref id) if id == "missing"));
}

#[tokio::test]
async fn deleting_last_bookmark_persists_empty_collection() {
    let dir = TempDir::new().unwrap();
    let settings = StorageSettings {
        enable_table_provider: false,
        ..settings_in(&dir)
    };
    let mut app = App::open(&settings).await;
    let only = app.add_bookmark(&draft("Only", "https://only.test")).await.unwrap();

    app.delete_bookmark(&only.id).await.unwrap();
    assert!(app.bookmarks().is_empty());

    let reopened = App::open(&settings).await;
    assert!(reopened.bookmarks().is_empty());
    assert!(matches!(
        app.delete_bookmark(&only.id).await,
        Err(BookmarkError::NotFound(_))
    ));
}

#[tokio::test]
async fn sample_data_is_prepended() {
    let dir = TempDir::new().unwrap();
    let mut app = App::open(&settings_in(&dir)).await;
    let mine = app.add_bookmark(&draft("Mine", "https://mine.test")).await.unwrap();

    let added = app.add_sample_data().await.unwrap();

    assert_eq!(added, 3);
    let titles: Vec<_> = app.bookmarks().iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Next.js Documentation", "Tailwind CSS", "GitHub", "Mine"]);
    assert_eq!(app.bookmarks()[3], mine);
}

#[test]
fn samples_have_distinct_ids_and_favicons() {
    let samples = sample_bookmarks().unwrap();
    assert_eq!(samples.len(), 3);
    assert_ne!(samples[0].id, samples[1].id);
    assert_eq!(
        samples[2].favicon.as_deref(),
        Some("https://www.google.com/s2/favicons?domain=github.com&sz=32")
    );
}

#[tokio::test]
async fn clear_all_empties_memory_and_storage() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir);
    let mut app = App::open(&settings).await;
    app.add_sample_data().await.unwrap();

    app.clear_all().await;

    assert!(app.bookmarks().is_empty());
    assert!(App::open(&settings).await.bookmarks().is_empty());
}

#[tokio::test]
async fn import_appends_and_reports_skips() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(&dir);
    let mut app = App::open(&settings).await;
    let existing = app.add_bookmark(&draft("Existing", "https://existing.test")).await.unwrap();

    let text = r#"{"version": "1.0", "exportedAt": "2024-01-01T00:00:00.000Z", "bookmarks": [
        {"id": "imported", "title": "Imported", "url": "https://imported.test", "tags": ["a"],
         "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-01T00:00:00.000Z"},
        {"id": "broken", "title": "Broken"}
    ]}"#;
    let report = app.import_backup(text).await.unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    let ids: Vec<_> = app.bookmarks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec![existing.id.as_str(), "imported"]);

    let reopened = App::open(&settings).await;
    assert_eq!(reopened.bookmarks(), app.bookmarks());
}

#[tokio::test]
async fn invalid_import_leaves_collection_untouched() {
    let dir = TempDir::new().unwrap();
    let mut app = App::open(&settings_in(&dir)).await;
    app.add_bookmark(&draft("Keep", "https://keep.test")).await.unwrap();
    let before = app.bookmarks().to_vec();

    let err = app.import_backup(r#"{"version": "1.0"}"#).await.unwrap_err();

    assert!(matches!(err, BookmarkError::Storage(StorageError::InvalidFormat(_))));
    assert_eq!(app.bookmarks(), before.as_slice());
}

#[tokio::test]
async fn export_produces_importable_backup() {
    let dir = TempDir::new().unwrap();
    let mut app = App::open(&settings_in(&dir)).await;
    app.add_sample_data().await.unwrap();

    let export = app.export_backup().unwrap();
    assert!(export.file_name.starts_with("linkvault-backup-"));

    let other_dir = TempDir::new().unwrap();
    let mut other = App::open(&settings_in(&other_dir)).await;
    other.import_backup(&export.content).await.unwrap();
    assert_eq!(other.bookmarks(), app.bookmarks());

    let path = app.write_backup(other_dir.path()).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn failed_save_keeps_change_in_memory_and_reports() {
    let mut app = App::with_manager(StorageManager::new(vec![Box::new(RejectingProvider)]));

    let err = app.add_bookmark(&draft("A", "https://a.test")).await.unwrap_err();

    assert!(matches!(
        err,
        BookmarkError::Storage(StorageError::AllProvidersFailed { .. })
    ));
    assert_eq!(app.bookmarks().len(), 1);
}

#[tokio::test]
async fn with_manager_loads_on_demand() {
    let provider = KeyValueProvider::new(MemoryMedium::new(), "bookmarks");
    let samples = sample_bookmarks().unwrap();
    provider.save(&samples).await.unwrap();

    let mut app = App::with_manager(StorageManager::new(vec![Box::new(provider)]));
    assert!(app.bookmarks().is_empty());

    assert_eq!(app.load().await, 3);
    assert_eq!(app.bookmarks(), samples.as_slice());
    assert_eq!(app.current_provider_name(), "key-value");
}
