//! Transactional table storage provider.
//!
//! Stores one SQLite row per bookmark, keyed by `id`, with a `position`
//! column preserving collection order. The schema is created the first time
//! the database is opened. `save` clears the table and inserts every record
//! inside one transaction, so either the whole collection is written or the
//! previous contents survive untouched.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tokio::sync::Mutex;
use tracing::debug;

use super::StorageProvider;
use crate::database::Database;
use crate::services::record_codec;
use crate::types::backup::{LoadedCollection, SkippedRecord};
use crate::types::bookmark::{Bookmark, WireBookmark};
use crate::types::errors::{StorageError, StorageResult};

const NAME: &str = "sqlite-table";

#[derive(Debug, Clone)]
enum DatabaseSource {
    File(PathBuf),
    Memory,
}

impl DatabaseSource {
    fn open(&self) -> StorageResult<Database> {
        let opened = match self {
            DatabaseSource::File(path) => Database::open(path),
            DatabaseSource::Memory => Database::open_in_memory(),
        };
        opened.map_err(|e| StorageError::unavailable(NAME, format!("failed to open database: {}", e)))
    }
}

/// Row as read from the `bookmarks` table, before validation.
struct StoredRow {
    id: String,
    title: String,
    url: String,
    description: String,
    tags: String,
    favicon: Option<String>,
    created_at: String,
    updated_at: String,
}

impl StoredRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            description: row.get(3)?,
            tags: row.get(4)?,
            favicon: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_wire(self) -> Result<WireBookmark, String> {
        let tags: Vec<String> =
            serde_json::from_str(&self.tags).map_err(|e| format!("tags: {}", e))?;
        Ok(WireBookmark {
            id: self.id,
            title: self.title,
            url: self.url,
            description: self.description,
            tags,
            favicon: self.favicon,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Provider persisting bookmarks as rows of a SQLite table.
///
/// The connection is opened lazily and kept for the provider's lifetime.
/// A failed open is not cached, so the next call retries.
pub struct TableProvider {
    source: DatabaseSource,
    db: Arc<Mutex<Option<Database>>>,
}

impl TableProvider {
    pub const NAME: &'static str = NAME;

    /// Provider backed by a database file. The parent directory must exist.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DatabaseSource::File(path.into()),
            db: Arc::new(Mutex::new(None)),
        }
    }

    /// Provider backed by a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            source: DatabaseSource::Memory,
            db: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs `op` against the open database on the blocking pool.
    ///
    /// The connection lock is a FIFO tokio mutex whose guard moves into the
    /// blocking task: a call abandoned by its caller still holds the lock
    /// until its work finishes, and queued calls run in issue order.
    async fn with_db<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> StorageResult<T> + Send + 'static,
    {
        let mut guard = Arc::clone(&self.db).lock_owned().await;
        let source = self.source.clone();
        tokio::task::spawn_blocking(move || {
            if guard.is_none() {
                *guard = Some(source.open()?);
            }
            let database = guard
                .as_mut()
                .ok_or_else(|| StorageError::unavailable(NAME, "database not open"))?;
            op(database)
        })
        .await
        .map_err(|e| StorageError::unavailable(NAME, format!("storage task failed: {}", e)))?
    }
}

fn write_failed(e: impl std::fmt::Display) -> StorageError {
    StorageError::write_failed(NAME, e.to_string())
}

fn replace_all(db: &mut Database, records: &[WireBookmark]) -> StorageResult<()> {
    let tx = db.connection_mut().transaction().map_err(write_failed)?;
    tx.execute("DELETE FROM bookmarks", []).map_err(write_failed)?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO bookmarks \
                 (id, position, title, url, description, tags, favicon, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .map_err(write_failed)?;
        for (position, record) in records.iter().enumerate() {
            let tags = serde_json::to_string(&record.tags).map_err(write_failed)?;
            stmt.execute(params![
                record.id,
                position as i64,
                record.title,
                record.url,
                record.description,
                tags,
                record.favicon,
                record.created_at,
                record.updated_at,
            ])
            .map_err(|e| write_failed(format!("insert '{}' failed: {}", record.id, e)))?;
        }
    }
    // Dropping `tx` without commit rolls back the delete and any inserts.
    tx.commit().map_err(write_failed)
}

fn read_all(db: &Database) -> StorageResult<LoadedCollection> {
    let read_failed = |e: rusqlite::Error| StorageError::unavailable(NAME, format!("read failed: {}", e));
    let mut stmt = db
        .connection()
        .prepare(
            "SELECT id, title, url, description, tags, favicon, created_at, updated_at \
             FROM bookmarks ORDER BY position, rowid",
        )
        .map_err(read_failed)?;
    let rows = stmt.query_map([], StoredRow::from_row).map_err(read_failed)?;

    let mut loaded = LoadedCollection::default();
    for (index, row) in rows.enumerate() {
        let stored = match row {
            Ok(stored) => stored,
            Err(e) => {
                loaded.skipped.push(SkippedRecord {
                    index,
                    id: None,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let id = stored.id.clone();
        let decoded = stored.into_wire().and_then(|wire| {
            record_codec::decode(index, wire).map_err(record_codec::skip_reason)
        });
        match decoded {
            Ok(bookmark) => loaded.bookmarks.push(bookmark),
            Err(reason) => loaded.skipped.push(SkippedRecord {
                index,
                id: Some(id),
                reason,
            }),
        }
    }
    Ok(loaded)
}

#[async_trait]
impl StorageProvider for TableProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn save(&self, bookmarks: &[Bookmark]) -> StorageResult<()> {
        let records = record_codec::encode_all(bookmarks);
        let count = records.len();
        self.with_db(move |db| replace_all(db, &records)).await?;
        debug!(provider = NAME, count, "saved bookmarks");
        Ok(())
    }

    async fn load(&self) -> StorageResult<LoadedCollection> {
        let loaded = self.with_db(|db| read_all(db)).await?;
        debug!(
            provider = NAME,
            count = loaded.len(),
            skipped = loaded.skipped.len(),
            "loaded bookmarks"
        );
        Ok(loaded)
    }

    async fn clear(&self) -> StorageResult<()> {
        self.with_db(|db| {
            db.connection()
                .execute("DELETE FROM bookmarks", [])
                .map(|_| ())
                .map_err(write_failed)
        })
        .await
    }
}
